// * Page Generation Engine
// * intent -> context -> component fan-out -> assembly -> quality -> done

use crate::cache::{CacheStore, InMemoryCacheStore, RedisCacheStore};
use crate::components::{
    ArticleStrategy, ComponentGenerate, ComponentGenerator, ComponentResult, CtaStrategy,
    GenerationError, GenerationStatsLog, HeroStrategy,
};
use crate::config::constants::MIN_QUERY_LENGTH;
use crate::config::PagecraftConfig;
use crate::engine::assembly::assemble_page;
use crate::engine::fallback::basic_page;
use crate::engine::intent::IntentAnalyzer;
use crate::engine::interests::{InMemoryInterestStore, InterestResolver, InterestStore};
use crate::engine::quality::score_page;
use crate::models::{
    ComponentType, DiscoveryResult, IntentAnalysis, PageContent, PageTemplate,
    PersonalizationContext, QualityMetrics, UserContext,
};
use crate::network::{
    InMemoryUsageSink, ProviderError, ProviderRegistry, RedisUsageSink, UsageTracker,
};
use crate::ops::telemetry;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The only error `generate_page_content` returns
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider setup failed: {0}")]
    ProviderSetup(#[from] ProviderError),
}

/// Outcome of one page request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGenerationResult {
    pub success: bool,
    pub content: PageContent,
    pub components: Vec<ComponentResult>,
    pub quality_metrics: QualityMetrics,
    pub confidence: f64,
    /// Seconds
    pub generation_time: f64,
}

impl PageGenerationResult {
    /// Auto-approval hint for the persistence collaborator
    pub fn meets_threshold(&self, confidence_threshold: f64) -> bool {
        self.confidence >= confidence_threshold
    }

    /// True when the page came from the basic fallback path
    pub fn is_basic(&self) -> bool {
        self.content.template == PageTemplate::Basic
    }
}

/// Usage rollups in Redis when configured and reachable, otherwise in process
async fn usage_tracker(redis_url: Option<&str>) -> (UsageTracker, Option<Arc<InMemoryUsageSink>>) {
    if let Some(url) = redis_url {
        match RedisUsageSink::new(url).await {
            Ok(sink) => {
                tracing::info!("Recording provider usage in Redis");
                return (UsageTracker::new(Arc::new(sink)), None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis usage sink unavailable, recording usage in memory");
            }
        }
    }
    let (tracker, sink) = UsageTracker::in_memory();
    (tracker, Some(sink))
}

pub struct PageGenerationEngine {
    config: PagecraftConfig,
    analyzer: IntentAnalyzer,
    interests: InterestResolver,
    generators: BTreeMap<ComponentType, Arc<dyn ComponentGenerate>>,
    registry: Arc<ProviderRegistry>,
    cache: Arc<dyn CacheStore>,
    stats: Arc<GenerationStatsLog>,
    usage: Option<Arc<InMemoryUsageSink>>,
}

impl PageGenerationEngine {
    /// Wires the three generators over shared registry, cache and stats
    pub fn new(
        config: PagecraftConfig,
        registry: Arc<ProviderRegistry>,
        cache: Arc<dyn CacheStore>,
        interest_store: Arc<dyn InterestStore>,
    ) -> Self {
        let stats = Arc::new(GenerationStatsLog::with_capacity(
            config.generation.stats_log_capacity,
        ));

        let hero = ComponentGenerator::new(HeroStrategy::new(), registry.clone(), cache.clone(), stats.clone())
            .with_config(&config);
        let article =
            ComponentGenerator::new(ArticleStrategy::new(), registry.clone(), cache.clone(), stats.clone())
                .with_config(&config);
        let cta = ComponentGenerator::new(CtaStrategy::new(), registry.clone(), cache.clone(), stats.clone())
            .with_config(&config);

        let mut generators: BTreeMap<ComponentType, Arc<dyn ComponentGenerate>> = BTreeMap::new();
        generators.insert(ComponentType::Hero, Arc::new(hero));
        generators.insert(ComponentType::Article, Arc::new(article));
        generators.insert(ComponentType::Cta, Arc::new(cta));

        Self {
            interests: InterestResolver::new(interest_store, &config.engine),
            analyzer: IntentAnalyzer::new(),
            config,
            generators,
            registry,
            cache,
            stats,
            usage: None,
        }
    }

    /// Builds providers, cache and interest store from configuration
    ///
    /// A configured Redis cache that cannot be reached degrades to the
    /// in-memory store.
    pub async fn from_config(config: PagecraftConfig) -> Result<Self, EngineError> {
        let (tracker, sink) = usage_tracker(config.cache.redis_url.as_deref()).await;
        let registry = Arc::new(ProviderRegistry::from_config(&config, Some(Arc::new(tracker)))?);

        let cache: Arc<dyn CacheStore> = match &config.cache.redis_url {
            Some(url) => match RedisCacheStore::new(url).await {
                Ok(store) => {
                    tracing::info!("Using Redis component cache");
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Redis cache unavailable, using in-memory cache");
                    Arc::new(InMemoryCacheStore::with_capacity(config.cache.max_entries))
                }
            },
            None => Arc::new(InMemoryCacheStore::with_capacity(config.cache.max_entries)),
        };

        let mut engine = Self::new(config, registry, cache, Arc::new(InMemoryInterestStore::new()));
        engine.usage = sink;
        Ok(engine)
    }

    /// Replaces the generator for its component type
    pub fn with_generator(mut self, generator: Arc<dyn ComponentGenerate>) -> Self {
        self.generators.insert(generator.component_type(), generator);
        self
    }

    pub fn config(&self) -> &PagecraftConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn stats(&self) -> &Arc<GenerationStatsLog> {
        &self.stats
    }

    /// In-process token and cost rollups; `None` when rollups go to Redis
    /// or the engine was not built from configuration
    pub fn usage(&self) -> Option<&Arc<InMemoryUsageSink>> {
        self.usage.as_ref()
    }

    pub fn intent_analyzer(&self) -> &IntentAnalyzer {
        &self.analyzer
    }

    /// Generates a full page, or a basic page when nothing usable came back
    ///
    /// Only a query shorter than the minimum length is an error.
    pub async fn generate_page_content(
        &self,
        search_query: &str,
        discovery_results: &[DiscoveryResult],
        session_id: Option<&str>,
        user_context: Option<&UserContext>,
    ) -> Result<PageGenerationResult, EngineError> {
        let started = Instant::now();
        let query = search_query.trim();
        let query_len = query.chars().count();
        if query_len < MIN_QUERY_LENGTH {
            tracing::warn!(query = %query, "Rejected page request with short query");
            return Err(EngineError::InvalidInput(format!(
                "search query must be at least {} characters (got {})",
                MIN_QUERY_LENGTH, query_len
            )));
        }

        // * Stage 1: interests and intent
        let explicit = user_context.map(|u| u.interests.clone()).unwrap_or_default();
        let interests = self.interests.resolve(session_id, query, &explicit).await;
        let analysis = self.analyzer.analyze(query);

        // * Stage 2: personalization context
        let context = build_context(query, analysis, interests, discovery_results, user_context);

        // * Stage 3: fan-out
        let components = self.run_generators(&context, discovery_results, started).await;

        // * Stage 4: assembly, or the basic page
        let all_fell_back = components.iter().all(|c| c.is_fallback());
        let (content, components) = if all_fell_back {
            tracing::warn!(query = %query, "Every component fell back, serving basic page");
            let page = basic_page(&context, discovery_results, "all components fell back");
            let basic: Vec<ComponentResult> = page.components().cloned().collect();
            (page, basic)
        } else {
            match assemble_page(&context.intent_context, &components) {
                Ok(page) => (page, components),
                Err(e) => {
                    tracing::error!(query = %query, error = %e, "Page assembly failed, serving basic page");
                    let page = basic_page(&context, discovery_results, &e.to_string());
                    let basic: Vec<ComponentResult> = page.components().cloned().collect();
                    (page, basic)
                }
            }
        };

        // * Stage 5: quality
        let (quality_metrics, confidence) = score_page(&context, &components);
        let generation_time = started.elapsed().as_secs_f64();

        telemetry::record_page_generated(content.template.as_str(), generation_time);
        tracing::info!(
            query = %query,
            intent = context.primary_intent().as_str(),
            template = content.template.as_str(),
            components = components.len(),
            confidence = confidence,
            generation_time = generation_time,
            "Page generated"
        );

        Ok(PageGenerationResult {
            success: true,
            content,
            components,
            quality_metrics,
            confidence,
            generation_time,
        })
    }

    // * Suggested generators in order; anything past the deadline becomes a fallback
    async fn run_generators(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
        started: Instant,
    ) -> Vec<ComponentResult> {
        let deadline = tokio::time::Instant::from_std(started) + self.config.engine.request_deadline();
        let selected: Vec<Arc<dyn ComponentGenerate>> = context
            .intent_context
            .suggested_components
            .iter()
            .filter_map(|ct| self.generators.get(ct).cloned())
            .collect();

        let abandon = |generator: &Arc<dyn ComponentGenerate>| {
            let component_type = generator.component_type();
            tracing::warn!(
                component_type = component_type.as_str(),
                query = %context.search_query,
                "Request deadline reached, abandoning component"
            );
            generator.fallback_component(
                context,
                discovery_results,
                &GenerationError::DeadlineExceeded(component_type),
                started.elapsed(),
            )
        };

        if self.config.engine.parallel_fan_out {
            let calls = selected.iter().map(|generator| async move {
                tokio::time::timeout_at(deadline, generator.generate_component(context, discovery_results)).await
            });
            let outcomes = join_all(calls).await;

            selected
                .iter()
                .zip(outcomes)
                .map(|(generator, outcome)| outcome.unwrap_or_else(|_| abandon(generator)))
                .collect()
        } else {
            let mut results = Vec::with_capacity(selected.len());
            for generator in &selected {
                if tokio::time::Instant::now() >= deadline {
                    results.push(abandon(generator));
                    continue;
                }
                let outcome =
                    tokio::time::timeout_at(deadline, generator.generate_component(context, discovery_results))
                        .await;
                results.push(outcome.unwrap_or_else(|_| abandon(generator)));
            }
            results
        }
    }
}

/// Personalization context for one request, with caller overrides applied
pub fn build_context(
    query: &str,
    analysis: IntentAnalysis,
    interests: BTreeMap<String, f64>,
    discovery_results: &[DiscoveryResult],
    user_context: Option<&UserContext>,
) -> PersonalizationContext {
    let mut context = PersonalizationContext::new(query, analysis)
        .with_interests(interests)
        .with_available_content(discovery_results.to_vec());

    if let Some(user) = user_context {
        if let Some(tone) = user.tone_preference {
            context = context.with_tone(tone);
        }
        if let Some(level) = user.complexity_level {
            context = context.with_complexity(level);
        }
        if let Some(preferences) = &user.content_preferences {
            context.content_preferences = preferences.clone();
        }
    }
    context
}
