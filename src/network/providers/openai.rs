// * OpenAI-style chat completion provider

use crate::config::constants::{OPENAI_TIMEOUT_SECS, PROVIDER_OPENAI};
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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const API_KEY_ENV: &str = "OPENAI_API_KEY";
const COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

pub struct OpenAiProvider {
    transport: HttpTransport,
    api_key: Option<String>,
    base_url: String,
    model: String,
    usage_tracker: Option<Arc<UsageTracker>>,
}

impl OpenAiProvider {
    /// Creates a provider against the public API with the default model
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: HttpTransport::new(Duration::from_secs(OPENAI_TIMEOUT_SECS))?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            usage_tracker: None,
        })
    }

    /// Creates a provider from its `[providers.openai]` section
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout_secs.unwrap_or(OPENAI_TIMEOUT_SECS);
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
            .ok_or_else(|| ProviderError::NotConfigured(PROVIDER_OPENAI.to_string()))?;

        let model = options.model.as_deref().unwrap_or(&self.model);
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_message.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = endpoint(&self.base_url, COMPLETIONS_PATH)?;
        let headers = [("authorization", format!("Bearer {}", api_key))];
        let response: ChatResponse = self.transport.post_json(url, &headers, &request).await?;

        parse_chat_response(response, model)
    }
}

/// Extracts the first choice; an empty choice list or blank content is invalid
pub(crate) fn parse_chat_response(
    response: ChatResponse,
    requested_model: &str,
) -> Result<GenerationResponse, ProviderError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::InvalidResponse("completion contained no message content".to_string())
        })?;

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(GenerationResponse {
        content,
        usage,
        model: response.model.unwrap_or_else(|| requested_model.to_string()),
    })
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn id(&self) -> &str {
        PROVIDER_OPENAI
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
        finish_call(PROVIDER_OPENAI, self.usage_tracker.as_ref(), result).await
    }
}
