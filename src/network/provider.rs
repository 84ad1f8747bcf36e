// * Uniform AI provider capability: generate(prompt, options) -> {content, usage, model}

use crate::network::errors::ProviderError;
use crate::network::usage::UsageTracker;
use crate::ops::telemetry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-call generation options; unset fields use the provider's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_message: Option<String>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn system_message(mut self, message: &str) -> Self {
        self.system_message = Some(message.to_string());
        self
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Successful generation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
}

/// One implementation per vendor
///
/// `generate` fails with `NotConfigured` when no credential is set,
/// `RequestFailed` on transport or non-2xx errors and `InvalidResponse`
/// when the payload does not have the expected shape.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Registry identifier (e.g. `"openai"`)
    fn id(&self) -> &str;

    /// Model used when the options do not name one
    fn default_model(&self) -> &str;

    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, ProviderError>;
}

/// Shared success/failure bookkeeping for vendor implementations
pub(crate) async fn finish_call(
    provider_id: &str,
    usage_tracker: Option<&Arc<UsageTracker>>,
    result: Result<GenerationResponse, ProviderError>,
) -> Result<GenerationResponse, ProviderError> {
    match &result {
        Ok(response) => {
            telemetry::record_provider_request(provider_id, "success");
            telemetry::record_provider_tokens(provider_id, response.usage.total_tokens as u64);
            if let Some(tracker) = usage_tracker {
                tracker
                    .record(provider_id, &response.model, &response.usage)
                    .await;
            }
            tracing::debug!(
                provider = provider_id,
                model = %response.model,
                total_tokens = response.usage.total_tokens,
                "Provider call succeeded"
            );
        }
        Err(e) => {
            telemetry::record_provider_request(provider_id, e.kind());
            tracing::warn!(provider = provider_id, error = %e, "Provider call failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = GenerationOptions::new()
            .model("gpt-4o-mini")
            .temperature(0.6)
            .max_tokens(500)
            .system_message("You write web copy.");
        assert_eq!(options.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(options.max_tokens, Some(500));
        assert!(options.system_message.is_some());
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = TokenUsage::new(u32::MAX, 10);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(TokenUsage::new(12, 30).total_tokens, 42);
    }
}
