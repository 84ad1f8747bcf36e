// * AI provider plumbing: transport, vendor clients, registry and usage accounting

pub mod client;
pub mod errors;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod usage;

pub use client::HttpTransport;
pub use errors::ProviderError;
pub use provider::{AiProvider, GenerationOptions, GenerationResponse, TokenUsage};
pub use providers::{AnthropicProvider, GoogleProvider, OpenAiProvider, StaticProvider};
pub use registry::{select_provider, ProviderRegistry};
pub use usage::{
    month_key, InMemoryUsageSink, ModelPrice, RedisUsageSink, UsageError, UsageRollup,
    UsageSink, UsageTracker,
};
