use pagecraft::config::PagecraftConfig;
use pagecraft::network::{
    month_key, select_provider, AiProvider, GenerationOptions, ProviderError, ProviderRegistry,
    StaticProvider, UsageTracker,
};
use std::sync::Arc;

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_preferred_provider_wins() {
    let picked = select_provider(&ids(&["openai", "anthropic", "google"]), &ids(&["anthropic"]));
    assert_eq!(picked.as_deref(), Some("anthropic"));
}

#[test]
fn test_falls_back_to_first_available() {
    let picked = select_provider(&ids(&["google", "openai"]), &ids(&["anthropic"]));
    assert_eq!(picked.as_deref(), Some("google"));
    assert_eq!(select_provider(&[], &ids(&["openai"])), None);
}

#[test]
fn test_registry_skips_unconfigured() {
    let registry = ProviderRegistry::new()
        .with_provider(Arc::new(StaticProvider::unconfigured("openai")))
        .with_provider(Arc::new(StaticProvider::new("anthropic", "ok")))
        .with_provider(Arc::new(StaticProvider::new("google", "ok")));

    assert_eq!(registry.get_available_providers(), ids(&["anthropic", "google"]));
    let provider = registry.select_provider(&ids(&["openai", "google"])).unwrap();
    assert_eq!(provider.id(), "google");
}

#[test]
fn test_registry_from_config_without_credentials() {
    let config = PagecraftConfig::from_toml_str(
        r#"
        [providers.openai]
        api_key_env = "PAGECRAFT_TEST_UNSET_OPENAI"
        [providers.anthropic]
        api_key_env = "PAGECRAFT_TEST_UNSET_ANTHROPIC"
        [providers.google]
        api_key_env = "PAGECRAFT_TEST_UNSET_GOOGLE"
        [providers.static]
        enabled = true
        "#,
    )
    .unwrap();

    let registry = ProviderRegistry::from_config(&config, None).unwrap();
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.get_available_providers(), ids(&["static"]));
}

#[tokio::test]
async fn test_unconfigured_call_is_not_configured_error() {
    let provider = StaticProvider::unconfigured("openai");
    let err = provider
        .generate("prompt", &GenerationOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotConfigured(_)));
}

#[tokio::test]
async fn test_usage_is_rolled_up_per_month_and_model() {
    let (tracker, sink) = UsageTracker::in_memory();
    let provider = StaticProvider::new("openai", "three word answer").with_usage_tracker(Arc::new(tracker));

    let options = GenerationOptions::new().model("gpt-4o-mini");
    provider.generate("a short prompt", &options).await.unwrap();
    provider.generate("a short prompt", &options).await.unwrap();

    let rollup = sink
        .rollup(&month_key(chrono::Utc::now()), "gpt-4o-mini")
        .expect("rollup recorded");
    assert_eq!(rollup.requests, 2);
    assert_eq!(rollup.prompt_tokens, 6);
    assert_eq!(rollup.completion_tokens, 6);
    assert_eq!(rollup.total_tokens, 12);
    assert!(rollup.estimated_cost_usd > 0.0);
}
