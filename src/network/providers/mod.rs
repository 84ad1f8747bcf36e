// * Vendor implementations of AiProvider

pub mod anthropic;
pub mod canned;
pub mod google;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use canned::StaticProvider;
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;
