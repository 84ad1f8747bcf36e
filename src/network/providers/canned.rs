// * Canned provider for offline runs and deterministic tests

use crate::config::constants::PROVIDER_STATIC;
use crate::network::errors::ProviderError;
use crate::network::provider::{
    finish_call, AiProvider, GenerationOptions, GenerationResponse, TokenUsage,
};
use crate::network::usage::UsageTracker;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STATIC_MODEL: &str = "static";

// * Prompt line the offline responder reads the query from
const QUERY_LINE_PREFIX: &str = "Search query:";

type Responder = dyn Fn(&str, &GenerationOptions) -> Result<String, ProviderError> + Send + Sync;

/// Provider that answers from a closure instead of a network call
pub struct StaticProvider {
    id: String,
    responder: Arc<Responder>,
    configured: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    usage_tracker: Option<Arc<UsageTracker>>,
}

impl StaticProvider {
    /// Always answers with `response`
    pub fn new(id: &str, response: impl Into<String>) -> Self {
        let response = response.into();
        Self::with_responder(id, move |_, _| Ok(response.clone()))
    }

    /// Answers with whatever `responder` returns for the prompt
    pub fn with_responder<F>(id: &str, responder: F) -> Self
    where
        F: Fn(&str, &GenerationOptions) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            responder: Arc::new(responder),
            configured: true,
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            usage_tracker: None,
        }
    }

    /// Always fails with `error`
    pub fn failing(id: &str, error: ProviderError) -> Self {
        Self::with_responder(id, move |_, _| Err(error.clone()))
    }

    /// Reports itself as unconfigured (no credential)
    pub fn unconfigured(id: &str) -> Self {
        let mut provider = Self::new(id, "");
        provider.configured = false;
        provider
    }

    /// Offline provider: a plain-text overview of the query found in the prompt
    pub fn offline() -> Self {
        Self::offline_as(PROVIDER_STATIC)
    }

    /// Offline responder registered under another provider id
    pub fn offline_as(id: &str) -> Self {
        Self::with_responder(id, |prompt, _| {
            let query = prompt
                .lines()
                .find_map(|line| line.trim().strip_prefix(QUERY_LINE_PREFIX))
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .unwrap_or("this topic");
            Ok(format!(
                "{q}\n\nA practical overview of {q}, covering what matters most before you start.\n\n\
                 Start by defining your goals for {q}. Compare the available options, weigh cost against quality \
                 and plan each step before committing.\n\n- Define your goals\n- Compare options\n- Plan the next step",
                q = query
            ))
        })
    }

    /// Sleeps before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_usage_tracker(mut self, tracker: Arc<UsageTracker>) -> Self {
        self.usage_tracker = Some(tracker);
        self
    }

    /// Number of `generate` calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|guard| guard.clone())
    }

    async fn call(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured(self.id.clone()));
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(prompt.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let content = (self.responder)(prompt, options)?;
        // * Rough whitespace token estimate
        let usage = TokenUsage::new(
            prompt.split_whitespace().count() as u32,
            content.split_whitespace().count() as u32,
        );

        Ok(GenerationResponse {
            content,
            usage,
            model: options
                .model
                .clone()
                .unwrap_or_else(|| STATIC_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl AiProvider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        STATIC_MODEL
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, ProviderError> {
        let result = self.call(prompt, options).await;
        finish_call(&self.id, self.usage_tracker.as_ref(), result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_response_and_count() {
        let provider = StaticProvider::new("openai", "hello world");
        let out = provider
            .generate("prompt text", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(out.content, "hello world");
        assert_eq!(out.model, "static");
        assert_eq!(out.usage.completion_tokens, 2);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt text"));
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider =
            StaticProvider::failing("google", ProviderError::RequestFailed("boom".into()));
        let err = provider
            .generate("x", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::RequestFailed("boom".into()));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_not_called() {
        let provider = StaticProvider::unconfigured("anthropic");
        assert!(!provider.is_configured());
        let err = provider
            .generate("x", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_reads_query_line() {
        let provider = StaticProvider::offline();
        let out = provider
            .generate(
                "You write web copy.\nSearch query: tile flooring\nIntent: commercial",
                &GenerationOptions::default(),
            )
            .await
            .unwrap();
        assert!(out.content.starts_with("tile flooring"));
    }

    #[tokio::test]
    async fn test_usage_is_recorded() {
        let (tracker, sink) = UsageTracker::in_memory();
        let provider = StaticProvider::new("static", "a b c").with_usage_tracker(Arc::new(tracker));
        provider
            .generate("one two", &GenerationOptions::default())
            .await
            .unwrap();
        let snapshot = sink.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].1.total_tokens, 5);
    }
}
