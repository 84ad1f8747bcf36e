// * Provider registry and preference-ordered selection

use crate::config::constants::{PROVIDER_ANTHROPIC, PROVIDER_GOOGLE, PROVIDER_OPENAI, PROVIDER_STATIC};
use crate::config::PagecraftConfig;
use crate::network::errors::ProviderError;
use crate::network::provider::AiProvider;
use crate::network::providers::{AnthropicProvider, GoogleProvider, OpenAiProvider, StaticProvider};
use crate::network::usage::UsageTracker;
use std::sync::Arc;

/// Picks the first preferred id that is available, else the first available id
///
/// Returns `None` only when nothing is available.
pub fn select_provider(available: &[String], preference: &[String]) -> Option<String> {
    preference
        .iter()
        .find(|id| available.contains(id))
        .or_else(|| available.first())
        .cloned()
}

/// Ordered set of providers, unique by id
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn AiProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the vendor providers named by the config
    ///
    /// OpenAI, Anthropic and Google are always registered (configured or not);
    /// the offline static provider only when `[providers.static]` is present and enabled.
    pub fn from_config(
        config: &PagecraftConfig,
        usage: Option<Arc<UsageTracker>>,
    ) -> Result<Self, ProviderError> {
        let mut registry = Self::new();

        let mut openai = OpenAiProvider::from_config(&config.provider(PROVIDER_OPENAI))?;
        let mut anthropic = AnthropicProvider::from_config(&config.provider(PROVIDER_ANTHROPIC))?;
        let mut google = GoogleProvider::from_config(&config.provider(PROVIDER_GOOGLE))?;
        if let Some(tracker) = &usage {
            openai = openai.with_usage_tracker(tracker.clone());
            anthropic = anthropic.with_usage_tracker(tracker.clone());
            google = google.with_usage_tracker(tracker.clone());
        }
        registry.register(Arc::new(openai));
        registry.register(Arc::new(anthropic));
        registry.register(Arc::new(google));

        if let Some(section) = config.providers.get(PROVIDER_STATIC) {
            if section.enabled {
                let mut offline = StaticProvider::offline();
                if let Some(tracker) = &usage {
                    offline = offline.with_usage_tracker(tracker.clone());
                }
                registry.register(Arc::new(offline));
            }
        }

        tracing::info!(
            available = ?registry.get_available_providers(),
            "Provider registry initialized"
        );
        Ok(registry)
    }

    /// Adds a provider; one with the same id is replaced in place
    pub fn register(&mut self, provider: Arc<dyn AiProvider>) {
        match self.providers.iter().position(|p| p.id() == provider.id()) {
            Some(index) => self.providers[index] = provider,
            None => self.providers.push(provider),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn AiProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Ids of configured providers in registration order
    pub fn get_available_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.id().to_string())
            .collect()
    }

    pub fn get_provider(&self, id: &str) -> Option<Arc<dyn AiProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Resolves the preference list against the configured providers
    pub fn select_provider(&self, preference: &[String]) -> Option<Arc<dyn AiProvider>> {
        let available = self.get_available_providers();
        let id = select_provider(&available, preference)?;
        self.get_provider(&id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
