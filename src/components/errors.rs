use crate::models::ComponentType;
use crate::network::ProviderError;
use thiserror::Error;

/// Errors inside one component generation; always contained as a fallback result
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No AI provider available for {0}")]
    NoProviderAvailable(ComponentType),

    #[error("Generation failed via {provider}: {source}")]
    GenerationFailed {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("Request deadline exceeded before {0} finished")]
    DeadlineExceeded(ComponentType),
}

impl GenerationError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::NoProviderAvailable(_) => "no_provider",
            GenerationError::GenerationFailed { .. } => "generation_failed",
            GenerationError::DeadlineExceeded(_) => "deadline_exceeded",
        }
    }
}
