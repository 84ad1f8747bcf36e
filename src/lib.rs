// * Pagecraft: personalized page generation
// * Multi-provider AI components, quality scoring and TTL caching

pub mod cache;
pub mod components;
pub mod config;
pub mod engine;
pub mod models;
pub mod network;
pub mod ops;
pub mod quality;
pub mod refinery;

pub use components::{ComponentResult, GenerationError};
pub use config::{load_config, PagecraftConfig};
pub use engine::{EngineError, PageGenerationEngine, PageGenerationResult};
pub use models::{DiscoveryResult, PageContent, UserContext};
