// * Runtime settings loaded from TOML
// * Every field carries a default so an empty file (or no file) is a valid configuration

use crate::config::constants::*;
use crate::models::{ComponentType, Intent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PagecraftConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Per-provider settings keyed by provider id (`[providers.openai]`)
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// How many discovery results participate in the cache key
    #[serde(default = "default_discovery_key_depth")]
    pub discovery_key_depth: usize,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    /// Use the Redis-backed store when set
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}
fn default_discovery_key_depth() -> usize {
    DEFAULT_DISCOVERY_KEY_DEPTH
}
fn default_cache_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            discovery_key_depth: DEFAULT_DISCOVERY_KEY_DEPTH,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxTokensConfig {
    #[serde(default = "default_max_tokens_generic")]
    pub generic: u32,
    #[serde(default = "default_max_tokens_hero")]
    pub hero: u32,
    #[serde(default = "default_max_tokens_article")]
    pub article: u32,
    #[serde(default = "default_max_tokens_cta")]
    pub cta: u32,
}

fn default_max_tokens_generic() -> u32 {
    MAX_TOKENS_GENERIC
}
fn default_max_tokens_hero() -> u32 {
    MAX_TOKENS_HERO
}
fn default_max_tokens_article() -> u32 {
    MAX_TOKENS_ARTICLE
}
fn default_max_tokens_cta() -> u32 {
    MAX_TOKENS_CTA
}

impl Default for MaxTokensConfig {
    fn default() -> Self {
        Self {
            generic: MAX_TOKENS_GENERIC,
            hero: MAX_TOKENS_HERO,
            article: MAX_TOKENS_ARTICLE,
            cta: MAX_TOKENS_CTA,
        }
    }
}

impl MaxTokensConfig {
    pub fn for_component(&self, component: ComponentType) -> u32 {
        let value = match component {
            ComponentType::Hero => self.hero,
            ComponentType::Article => self.article,
            ComponentType::Cta => self.cta,
        };
        if value == 0 {
            self.generic
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureTable {
    #[serde(default = "default_temp_commercial")]
    pub commercial: f32,
    #[serde(default = "default_temp_informational")]
    pub informational: f32,
    #[serde(default = "default_temp_educational")]
    pub educational: f32,
    #[serde(default = "default_temp_navigational")]
    pub navigational: f32,
}

fn default_temp_commercial() -> f32 {
    TEMPERATURE_COMMERCIAL
}
fn default_temp_informational() -> f32 {
    TEMPERATURE_INFORMATIONAL
}
fn default_temp_educational() -> f32 {
    TEMPERATURE_EDUCATIONAL
}
fn default_temp_navigational() -> f32 {
    TEMPERATURE_NAVIGATIONAL
}

impl Default for TemperatureTable {
    fn default() -> Self {
        Self {
            commercial: TEMPERATURE_COMMERCIAL,
            informational: TEMPERATURE_INFORMATIONAL,
            educational: TEMPERATURE_EDUCATIONAL,
            navigational: TEMPERATURE_NAVIGATIONAL,
        }
    }
}

impl TemperatureTable {
    pub fn for_intent(&self, intent: Intent) -> f32 {
        match intent {
            Intent::Commercial => self.commercial,
            Intent::Informational => self.informational,
            Intent::Educational => self.educational,
            Intent::Navigational => self.navigational,
        }
    }

    fn values(&self) -> [f32; 4] {
        [
            self.commercial,
            self.informational,
            self.educational,
            self.navigational,
        ]
    }
}

/// Ordered provider preference per component type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPreference {
    #[serde(default = "default_hero_preference")]
    pub hero: Vec<String>,
    #[serde(default = "default_article_preference")]
    pub article: Vec<String>,
    #[serde(default = "default_cta_preference")]
    pub cta: Vec<String>,
}

fn preference(ids: [&str; 3]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn default_hero_preference() -> Vec<String> {
    preference([PROVIDER_OPENAI, PROVIDER_ANTHROPIC, PROVIDER_GOOGLE])
}
fn default_article_preference() -> Vec<String> {
    preference([PROVIDER_ANTHROPIC, PROVIDER_OPENAI, PROVIDER_GOOGLE])
}
fn default_cta_preference() -> Vec<String> {
    preference([PROVIDER_OPENAI, PROVIDER_GOOGLE, PROVIDER_ANTHROPIC])
}

impl Default for ProviderPreference {
    fn default() -> Self {
        Self {
            hero: default_hero_preference(),
            article: default_article_preference(),
            cta: default_cta_preference(),
        }
    }
}

impl ProviderPreference {
    pub fn for_component(&self, component: ComponentType) -> &[String] {
        match component {
            ComponentType::Hero => &self.hero,
            ComponentType::Article => &self.article,
            ComponentType::Cta => &self.cta,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub max_tokens: MaxTokensConfig,
    #[serde(default)]
    pub temperature_by_intent: TemperatureTable,
    #[serde(default)]
    pub provider_preference: ProviderPreference,
    /// Passed through to the persistence collaborator for auto-approval
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_stats_capacity")]
    pub stats_log_capacity: usize,
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}
fn default_stats_capacity() -> usize {
    DEFAULT_STATS_LOG_CAPACITY
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: MaxTokensConfig::default(),
            temperature_by_intent: TemperatureTable::default(),
            provider_preference: ProviderPreference::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            stats_log_capacity: DEFAULT_STATS_LOG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_deadline")]
    pub request_deadline_secs: u64,
    /// Run component generators concurrently
    #[serde(default = "default_parallel")]
    pub parallel_fan_out: bool,
    #[serde(default = "default_interest_cache")]
    pub interest_cache_secs: u64,
    #[serde(default = "default_interest_ttl")]
    pub interest_ttl_secs: u64,
    #[serde(default = "default_interest_boost")]
    pub interest_query_boost: f64,
}

fn default_deadline() -> u64 {
    DEFAULT_REQUEST_DEADLINE_SECS
}
fn default_parallel() -> bool {
    true
}
fn default_interest_cache() -> u64 {
    INTEREST_CACHE_SECS
}
fn default_interest_ttl() -> u64 {
    INTEREST_TTL_SECS
}
fn default_interest_boost() -> f64 {
    INTEREST_QUERY_BOOST
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: DEFAULT_REQUEST_DEADLINE_SECS,
            parallel_fan_out: true,
            interest_cache_secs: INTEREST_CACHE_SECS,
            interest_ttl_secs: INTEREST_TTL_SECS,
            interest_query_boost: INTEREST_QUERY_BOOST,
        }
    }
}

impl EngineConfig {
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}

/// Settings for one AI provider; unset fields fall back to vendor defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the key (e.g. `OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_key_env: None,
            base_url: None,
            model: None,
            timeout_secs: None,
        }
    }
}

impl ProviderConfig {
    /// Resolves the credential: explicit key first, then the named (or default) env var
    pub fn resolve_api_key(&self, default_env: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        if let Some(key) = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }
        let env_name = self.api_key_env.as_deref().unwrap_or(default_env);
        std::env::var(env_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl PagecraftConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PagecraftConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings for a provider id, or defaults if the section is absent
    pub fn provider(&self, id: &str) -> ProviderConfig {
        self.providers.get(id).cloned().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("cache.ttl_seconds must be > 0".into()));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid("cache.max_entries must be > 0".into()));
        }

        if !(0.0..=1.0).contains(&self.generation.confidence_threshold) {
            return Err(ConfigError::Invalid(
                "generation.confidence_threshold must be in [0.0, 1.0]".into(),
            ));
        }

        for value in self.generation.temperature_by_intent.values() {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "temperature {} out of range [0.0, 2.0]",
                    value
                )));
            }
        }

        for component in ComponentType::ALL {
            for id in self.generation.provider_preference.for_component(component) {
                if !KNOWN_PROVIDERS.contains(&id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "unknown provider '{}' in {} preference (expected one of: {})",
                        id,
                        component,
                        KNOWN_PROVIDERS.join(", ")
                    )));
                }
            }
        }

        for id in self.providers.keys() {
            if !KNOWN_PROVIDERS.contains(&id.as_str()) {
                return Err(ConfigError::Invalid(format!("unknown provider section: {}", id)));
            }
        }

        if self.engine.request_deadline_secs == 0 {
            return Err(ConfigError::Invalid(
                "engine.request_deadline_secs must be > 0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.engine.interest_query_boost) {
            return Err(ConfigError::Invalid(
                "engine.interest_query_boost must be in [0.0, 1.0]".into(),
            ));
        }

        Ok(())
    }
}

/// Loads and validates configuration from a TOML file
pub fn load_config(path: &Path) -> Result<PagecraftConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    PagecraftConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = PagecraftConfig::from_toml_str("").unwrap();
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.cache.discovery_key_depth, 5);
        assert_eq!(config.generation.max_tokens.for_component(ComponentType::Article), 1200);
        assert!((config.generation.temperature_by_intent.for_intent(Intent::Commercial) - 0.8).abs() < f32::EPSILON);
        assert!((config.generation.temperature_by_intent.for_intent(Intent::Navigational) - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let toml = r#"
            [cache]
            ttl_seconds = 60

            [generation.temperature_by_intent]
            commercial = 0.9

            [generation.provider_preference]
            article = ["google", "openai"]
        "#;
        let config = PagecraftConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_MAX_ENTRIES);
        assert!((config.generation.temperature_by_intent.educational - 0.5).abs() < f32::EPSILON);
        assert_eq!(
            config.generation.provider_preference.for_component(ComponentType::Article),
            &["google".to_string(), "openai".to_string()]
        );
        assert_eq!(config.generation.provider_preference.hero[0], "openai");
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let err = PagecraftConfig::from_toml_str("[cache]\nttl_seconds = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_provider_in_preference() {
        let toml = "[generation.provider_preference]\nhero = [\"mystery\"]";
        let err = PagecraftConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let toml = "[generation]\nconfidence_threshold = 1.5";
        assert!(PagecraftConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_zero_max_tokens_falls_back_to_generic() {
        let toml = "[generation.max_tokens]\nhero = 0";
        let config = PagecraftConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.generation.max_tokens.for_component(ComponentType::Hero), 500);
    }

    #[test]
    fn test_provider_key_resolution_prefers_explicit_key() {
        let provider = ProviderConfig {
            api_key: Some("  sk-test ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            provider.resolve_api_key("PAGECRAFT_TEST_UNSET_KEY"),
            Some("sk-test".to_string())
        );

        let disabled = ProviderConfig {
            enabled: false,
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(disabled.resolve_api_key("PAGECRAFT_TEST_UNSET_KEY"), None);
    }

    #[test]
    fn test_provider_key_missing_env() {
        let provider = ProviderConfig {
            api_key_env: Some("PAGECRAFT_TEST_DEFINITELY_UNSET".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.resolve_api_key("ALSO_UNSET"), None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/pagecraft.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
