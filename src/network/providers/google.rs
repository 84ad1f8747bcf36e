// * Google Gemini generateContent provider

use crate::config::constants::{GOOGLE_TIMEOUT_SECS, PROVIDER_GOOGLE};
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

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

pub struct GoogleProvider {
    transport: HttpTransport,
    api_key: Option<String>,
    base_url: String,
    model: String,
    usage_tracker: Option<Arc<UsageTracker>>,
}

impl GoogleProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: HttpTransport::new(Duration::from_secs(GOOGLE_TIMEOUT_SECS))?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            usage_tracker: None,
        })
    }

    /// Creates a provider from its `[providers.google]` section
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout_secs.unwrap_or(GOOGLE_TIMEOUT_SECS);
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
            .ok_or_else(|| ProviderError::NotConfigured(PROVIDER_GOOGLE.to_string()))?;

        let model = options.model.as_deref().unwrap_or(&self.model);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            system_instruction: options.system_message.as_ref().map(|s| SystemInstruction {
                parts: vec![Part {
                    text: Some(s.clone()),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let url = endpoint(&self.base_url, &format!("models/{}:generateContent", model))?;
        let headers = [("x-goog-api-key", api_key.to_string())];
        let response: GenerateResponse =
            self.transport.post_json(url, &headers, &request).await?;

        parse_generate_response(response, model)
    }
}

/// Joins the text parts of the first candidate
pub(crate) fn parse_generate_response(
    response: GenerateResponse,
    requested_model: &str,
) -> Result<GenerationResponse, ProviderError> {
    let content: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "generateContent returned no candidate text".to_string(),
        ));
    }

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    Ok(GenerationResponse {
        content,
        usage,
        model: response
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
    })
}

#[async_trait]
impl AiProvider for GoogleProvider {
    fn id(&self) -> &str {
        PROVIDER_GOOGLE
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
        finish_call(PROVIDER_GOOGLE, self.usage_tracker.as_ref(), result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"headline\":"},{"text":"\"Hi\"}"}]}}],
                "usageMetadata":{"promptTokenCount":7,"candidatesTokenCount":4,"totalTokenCount":11},
                "modelVersion":"gemini-1.5-flash-002"}"#,
        )
        .unwrap();
        let out = parse_generate_response(response, DEFAULT_MODEL).unwrap();
        assert_eq!(out.content, r#"{"headline":"Hi"}"#);
        assert_eq!(out.usage.total_tokens, 11);
        assert_eq!(out.model, "gemini-1.5-flash-002");
    }

    #[test]
    fn test_parse_no_candidates_is_invalid() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            parse_generate_response(response, DEFAULT_MODEL),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request = GenerateRequest {
            contents: vec![],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: Some(0.5),
                max_output_tokens: Some(400),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 400);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_model_endpoint() {
        let url = endpoint(DEFAULT_BASE_URL, "models/gemini-1.5-flash:generateContent").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
