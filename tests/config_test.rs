use pagecraft::config::{load_config, ConfigError};
use pagecraft::models::{ComponentType, Intent};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [cache]
        ttl_seconds = 600
        discovery_key_depth = 3

        [generation]
        confidence_threshold = 0.8

        [generation.max_tokens]
        article = 900

        [generation.temperature_by_intent]
        commercial = 0.9

        [generation.provider_preference]
        hero = ["google", "openai"]

        [engine]
        request_deadline_secs = 30
        parallel_fan_out = false

        [providers.openai]
        api_key = "sk-test"
        model = "gpt-4o"
        timeout_secs = 10
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.cache.ttl(), Duration::from_secs(600));
    assert_eq!(config.cache.discovery_key_depth, 3);
    assert_eq!(config.generation.max_tokens.for_component(ComponentType::Article), 900);
    assert_eq!(config.generation.max_tokens.for_component(ComponentType::Hero), 400);
    assert!((config.generation.temperature_by_intent.for_intent(Intent::Commercial) - 0.9).abs() < f32::EPSILON);
    assert_eq!(config.generation.provider_preference.for_component(ComponentType::Hero)[0], "google");
    assert_eq!(config.engine.request_deadline(), Duration::from_secs(30));
    assert!(!config.engine.parallel_fan_out);
    assert_eq!(config.provider("openai").resolve_api_key("UNUSED_ENV").as_deref(), Some("sk-test"));
}

#[test]
fn test_empty_file_is_default() {
    let file = write_config("");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.cache.ttl_seconds, 3600);
    assert!((config.generation.confidence_threshold - 0.75).abs() < f64::EPSILON);
    assert!(config.engine.parallel_fan_out);
}

#[test]
fn test_unknown_provider_in_preference_is_rejected() {
    let file = write_config(
        r#"
        [generation.provider_preference]
        cta = ["mistral"]
        "#,
    );
    assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_zero_ttl_is_rejected() {
    let file = write_config("[cache]\nttl_seconds = 0\n");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let file = write_config("[cache\nttl_seconds = ");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(load_config(&missing), Err(ConfigError::Io { .. })));
}
