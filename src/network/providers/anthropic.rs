// * Anthropic messages provider

use crate::config::constants::{ANTHROPIC_TIMEOUT_SECS, MAX_TOKENS_GENERIC, PROVIDER_ANTHROPIC};
use crate::config::ProviderConfig;
use crate::network::client::{endpoint, HttpTransport};
use crate::network::errors::ProviderError;
use crate::network::provider::{
    finish_call, AiProvider, GenerationOptions, GenerationResponse, TokenUsage,
};
use crate::network::usage::UsageTracker;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const MESSAGES_PATH: &str = "messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    // * Required by the messages API
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

pub struct AnthropicProvider {
    transport: HttpTransport,
    api_key: Option<String>,
    base_url: String,
    model: String,
    usage_tracker: Option<Arc<UsageTracker>>,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: HttpTransport::new(Duration::from_secs(ANTHROPIC_TIMEOUT_SECS))?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            usage_tracker: None,
        })
    }

    /// Creates a provider from its `[providers.anthropic]` section
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout_secs.unwrap_or(ANTHROPIC_TIMEOUT_SECS);
        Ok(Self {
            transport: HttpTransport::new(Duration::from_secs(timeout))?,
            api_key: config.resolve_api_key(API_KEY_ENV),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            usage_tracker: None,
        })
    }

    pub fn with_usage_tracker(mut self, tracker: Arc<UsageTracker>) -> Self {
        self.usage_tracker = Some(tracker);
        self
    }

    async fn call(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(PROVIDER_ANTHROPIC.to_string()))?;

        let model = options.model.as_deref().unwrap_or(&self.model);
        let request = MessagesRequest {
            model,
            max_tokens: options.max_tokens.unwrap_or(MAX_TOKENS_GENERIC),
            system: options.system_message.as_deref(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
        };

        let url = endpoint(&self.base_url, MESSAGES_PATH)?;
        let headers = [
            ("x-api-key", api_key.to_string()),
            ("anthropic-version", API_VERSION.to_string()),
        ];
        let response: MessagesResponse =
            self.transport.post_json(url, &headers, &request).await?;

        parse_messages_response(response, model)
    }
}

/// Concatenates the text blocks of a messages response
pub(crate) fn parse_messages_response(
    response: MessagesResponse,
    requested_model: &str,
) -> Result<GenerationResponse, ProviderError> {
    let content: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    if content.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "messages response contained no text blocks".to_string(),
        ));
    }

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    Ok(GenerationResponse {
        content,
        usage,
        model: response.model.unwrap_or_else(|| requested_model.to_string()),
    })
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn id(&self) -> &str {
        PROVIDER_ANTHROPIC
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, ProviderError> {
        let result = self.call(prompt, options).await;
        finish_call(PROVIDER_ANTHROPIC, self.usage_tracker.as_ref(), result).await
    }
}
