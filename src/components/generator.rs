// * Fixed generation pipeline shared by every component type
// * cache -> validate -> context -> provider -> prompt -> call -> parse -> personalize -> score -> cache/stats

use crate::cache::{compute_cache_key, CacheStore};
use crate::components::errors::GenerationError;
use crate::components::stats::{GenerationStat, GenerationStatsLog};
use crate::components::strategy::ComponentStrategy;
use crate::components::types::{ComponentMetadata, ComponentResult, ContentSchema};
use crate::config::constants::MIN_QUERY_LENGTH;
use crate::config::{PagecraftConfig, TemperatureTable};
use crate::models::{ComponentType, DiscoveryResult, PersonalizationContext, QualityMetrics};
use crate::network::{GenerationOptions, ProviderRegistry};
use crate::ops::telemetry;
use crate::quality::score_component;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

// * Fallback components never claim more than this confidence
const FALLBACK_CONFIDENCE_CAP: f64 = 0.5;

/// Per-type generation parameters resolved from configuration
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub max_tokens: u32,
    pub temperatures: TemperatureTable,
    pub provider_preference: Vec<String>,
    pub cache_ttl: Duration,
    pub discovery_key_depth: usize,
}

impl GeneratorSettings {
    pub fn from_config(config: &PagecraftConfig, component_type: ComponentType) -> Self {
        Self {
            max_tokens: config.generation.max_tokens.for_component(component_type),
            temperatures: config.generation.temperature_by_intent.clone(),
            provider_preference: config
                .generation
                .provider_preference
                .for_component(component_type)
                .to_vec(),
            cache_ttl: config.cache.ttl(),
            discovery_key_depth: config.cache.discovery_key_depth,
        }
    }
}

/// Object-safe face of a generator, used by the page engine
#[async_trait]
pub trait ComponentGenerate: Send + Sync {
    fn component_type(&self) -> ComponentType;

    /// Always yields a result; failures become fallback content
    async fn generate_component(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> ComponentResult;

    /// Fallback result for a generation that was abandoned or failed outside the pipeline
    fn fallback_component(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
        error: &GenerationError,
        elapsed: Duration,
    ) -> ComponentResult;
}

/// Template-method generator parameterized by a strategy
pub struct ComponentGenerator<S: ComponentStrategy> {
    strategy: S,
    registry: Arc<ProviderRegistry>,
    cache: Arc<dyn CacheStore>,
    stats: Arc<GenerationStatsLog>,
    settings: GeneratorSettings,
}

impl<S: ComponentStrategy> ComponentGenerator<S> {
    /// Creates a generator with default configuration
    pub fn new(
        strategy: S,
        registry: Arc<ProviderRegistry>,
        cache: Arc<dyn CacheStore>,
        stats: Arc<GenerationStatsLog>,
    ) -> Self {
        let settings = GeneratorSettings::from_config(&PagecraftConfig::default(), strategy.component_type());
        Self {
            strategy,
            registry,
            cache,
            stats,
            settings,
        }
    }

    /// Applies the component's settings from `config`
    pub fn with_config(mut self, config: &PagecraftConfig) -> Self {
        self.settings = GeneratorSettings::from_config(config, self.strategy.component_type());
        self
    }

    pub fn with_settings(mut self, settings: GeneratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Deterministic cache key for this component and request
    pub fn cache_key(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> String {
        compute_cache_key(
            self.strategy.component_type(),
            context,
            discovery_results,
            self.settings.discovery_key_depth,
        )
    }

    /// Runs the full pipeline; never fails
    pub async fn generate(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> ComponentResult {
        let started = Instant::now();
        let component_type = self.strategy.component_type();
        let cache_key = self.cache_key(context, discovery_results);

        // * Step 1: cache lookup; errors count as misses
        match self.cache.get(&cache_key).await {
            Ok(Some(mut hit)) => {
                telemetry::record_cache_lookup("hit");
                telemetry::record_component_outcome(component_type.as_str(), "cache_hit");
                tracing::debug!(
                    component_type = component_type.as_str(),
                    query = %context.search_query,
                    cache_key = %cache_key,
                    "Component cache hit"
                );
                hit.from_cache = true;
                return hit;
            }
            Ok(None) => {
                telemetry::record_cache_lookup("miss");
                tracing::debug!(
                    component_type = component_type.as_str(),
                    cache_key = %cache_key,
                    "Component cache miss"
                );
            }
            Err(e) => {
                telemetry::record_cache_lookup("error");
                tracing::warn!(
                    component_type = component_type.as_str(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
            }
        }

        match self
            .run_pipeline(context, discovery_results, &cache_key, started)
            .await
        {
            Ok((result, provider)) => {
                // * Step 10: cache and record stats
                if let Err(e) = self
                    .cache
                    .set(&cache_key, &result, self.settings.cache_ttl)
                    .await
                {
                    tracing::warn!(
                        component_type = component_type.as_str(),
                        error = %e,
                        "Cache write failed"
                    );
                }

                self.stats.record(GenerationStat {
                    component_type,
                    generation_time: result.metadata.generation_time,
                    confidence: result.confidence,
                    provider,
                    query: context.search_query.clone(),
                    timestamp: Utc::now(),
                });
                telemetry::record_component_outcome(component_type.as_str(), "success");
                telemetry::record_generation_duration(
                    component_type.as_str(),
                    result.metadata.generation_time,
                );

                tracing::info!(
                    component_type = component_type.as_str(),
                    query = %context.search_query,
                    provider = ?result.metadata.ai_provider,
                    confidence = result.confidence,
                    "Component generated"
                );
                result
            }
            Err(error) => self.build_fallback(
                context,
                cache_key,
                &error,
                started.elapsed(),
            ),
        }
    }

    // * Steps 2-9; any error here becomes a fallback
    async fn run_pipeline(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
        cache_key: &str,
        started: Instant,
    ) -> Result<(ComponentResult, String), GenerationError> {
        let component_type = self.strategy.component_type();

        // * Step 2: validate
        validate_input(context)?;

        // * Step 3: type-specific context
        let generation_context = self.strategy.build_context(context, discovery_results);

        // * Step 4: provider selection
        let provider = self
            .registry
            .select_provider(&self.settings.provider_preference)
            .ok_or(GenerationError::NoProviderAvailable(component_type))?;
        let provider_id = provider.id().to_string();
        tracing::debug!(
            component_type = component_type.as_str(),
            provider = %provider_id,
            "Provider selected"
        );

        // * Step 5: prompt and parameters
        let prompt = self
            .strategy
            .build_prompt(context, &generation_context, discovery_results);
        let options = GenerationOptions::new()
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperatures.for_intent(context.primary_intent()))
            .system_message(self.strategy.system_message());

        // * Step 6: provider call
        let response = provider
            .generate(&prompt, &options)
            .await
            .map_err(|source| GenerationError::GenerationFailed {
                provider: provider_id.clone(),
                source,
            })?;

        // * Step 7: parse
        let mut content = self
            .strategy
            .parse_response(&response.content, context, &generation_context);

        // * Step 8: personalize
        self.strategy.personalize(&mut content, context);

        // * Step 9: quality, scored before required fields are backfilled
        let personalization = self.strategy.personalization_score(&content, context);
        let quality = score_component(
            &context.search_query,
            &content.flatten_text(),
            personalization,
            content.completeness(),
        );
        let overall = quality.overall_confidence;
        let quality = quality.with_component_score(component_type.as_str(), overall);

        content.fill_required_from(&self.strategy.fallback_content(context));

        let result = ComponentResult {
            success: true,
            confidence: quality.overall_confidence,
            content: content.into_content(),
            error: None,
            metadata: ComponentMetadata {
                component_type,
                ai_provider: Some(provider_id.clone()),
                generation_time: started.elapsed().as_secs_f64(),
                quality_metrics: Some(quality),
                cache_key: cache_key.to_string(),
                generated_at: Utc::now(),
                error_occurred: false,
            },
            from_cache: false,
        };
        Ok((result, provider_id))
    }

    fn build_fallback(
        &self,
        context: &PersonalizationContext,
        cache_key: String,
        error: &GenerationError,
        elapsed: Duration,
    ) -> ComponentResult {
        let component_type = self.strategy.component_type();
        let content = self.strategy.fallback_content(context);
        let quality = fallback_quality(
            &context.search_query,
            &content,
            self.strategy.personalization_score(&content, context),
        );
        let confidence = quality.overall_confidence;
        let quality = quality.with_component_score(component_type.as_str(), confidence);

        telemetry::record_component_outcome(component_type.as_str(), "fallback");
        tracing::warn!(
            component_type = component_type.as_str(),
            query = %context.search_query,
            error = %error,
            error_kind = error.kind(),
            "Component generation failed, using fallback"
        );

        ComponentResult {
            success: false,
            content: content.into_content(),
            error: Some(error.to_string()),
            metadata: ComponentMetadata {
                component_type,
                ai_provider: None,
                generation_time: elapsed.as_secs_f64(),
                quality_metrics: Some(quality),
                cache_key,
                generated_at: Utc::now(),
                error_occurred: true,
            },
            confidence,
            from_cache: false,
        }
    }
}

// * Fallback content is scored like generated content, capped
fn fallback_quality<C: ContentSchema>(query: &str, content: &C, personalization: f64) -> QualityMetrics {
    let scored = score_component(query, &content.flatten_text(), personalization, content.completeness());
    QualityMetrics::new(
        scored.overall_confidence.min(FALLBACK_CONFIDENCE_CAP),
        scored.content_relevance,
        scored.personalization_score,
        scored.completeness_score,
    )
}

/// Query length, interest ranges and intent presence
pub fn validate_input(context: &PersonalizationContext) -> Result<(), GenerationError> {
    let query_len = context.search_query.trim().chars().count();
    if query_len < MIN_QUERY_LENGTH {
        return Err(GenerationError::InvalidInput(format!(
            "search query must be at least {} characters (got {})",
            MIN_QUERY_LENGTH, query_len
        )));
    }

    for (topic, score) in &context.user_interests {
        if !score.is_finite() || !(0.0..=1.0).contains(score) {
            return Err(GenerationError::InvalidInput(format!(
                "interest '{}' has score {} outside [0, 1]",
                topic, score
            )));
        }
    }

    if context.intent_context.suggested_components.is_empty() {
        return Err(GenerationError::InvalidInput(
            "intent context has no suggested components".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl<S: ComponentStrategy> ComponentGenerate for ComponentGenerator<S> {
    fn component_type(&self) -> ComponentType {
        self.strategy.component_type()
    }

    async fn generate_component(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> ComponentResult {
        self.generate(context, discovery_results).await
    }

    fn fallback_component(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
        error: &GenerationError,
        elapsed: Duration,
    ) -> ComponentResult {
        let cache_key = self.cache_key(context, discovery_results);
        self.build_fallback(context, cache_key, error, elapsed)
    }
}
