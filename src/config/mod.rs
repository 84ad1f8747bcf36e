// * Configuration: compile-time defaults and the TOML-backed runtime settings

pub mod constants;
pub mod settings;

pub use settings::{
    load_config, CacheConfig, ConfigError, EngineConfig, GenerationConfig, MaxTokensConfig,
    PagecraftConfig, ProviderConfig, ProviderPreference, TemperatureTable,
};
