use pagecraft::cache::{CacheStore, InMemoryCacheStore};
use pagecraft::components::{
    ArticleStrategy, ComponentContent, ComponentGenerate, ComponentGenerator, CtaStrategy,
    GenerationStatsLog, HeroStrategy,
};
use pagecraft::models::{DiscoveryResult, Intent, IntentAnalysis, PersonalizationContext};
use pagecraft::network::{ProviderError, ProviderRegistry, StaticProvider};
use std::collections::BTreeMap;
use std::sync::Arc;

fn context(query: &str, intent: Intent) -> PersonalizationContext {
    let mut interests = BTreeMap::new();
    interests.insert("home_improvement".to_string(), 0.8);
    PersonalizationContext::new(query, IntentAnalysis::new(intent, 0.8, vec![])).with_interests(interests)
}

fn registry_with(provider: StaticProvider) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::new().with_provider(Arc::new(provider)))
}

fn article_json(main_content: &str) -> String {
    serde_json::json!({
        "title": "Bathroom Remodeling Basics",
        "summary": "What a bathroom remodel involves.",
        "introduction": "Planning a bathroom remodel starts with a budget.",
        "main_content": main_content,
        "key_points": ["Set a budget", "Pick materials"],
        "reading_time": 4,
        "difficulty_level": "beginner",
        "content_type": "guide",
        "tags": ["bathroom"]
    })
    .to_string()
}

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let provider = Arc::new(StaticProvider::new("openai", article_json("Short body about bathroom tile.")));
    let registry = Arc::new(ProviderRegistry::new().with_provider(provider.clone()));
    let generator = ComponentGenerator::new(
        ArticleStrategy::new(),
        registry,
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(GenerationStatsLog::new()),
    );
    let ctx = context("remodeling a bathroom", Intent::Informational);
    let results = vec![DiscoveryResult::new("Tile guide", "https://x.y/tile", 0.8)];

    let first = generator.generate(&ctx, &results).await;
    let second = generator.generate(&ctx, &results).await;

    assert!(first.success);
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.content, second.content);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_long_main_content_is_truncated() {
    let generator = ComponentGenerator::new(
        ArticleStrategy::new(),
        registry_with(StaticProvider::new("openai", article_json(&"a".repeat(2000)))),
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(GenerationStatsLog::new()),
    );

    let result = generator
        .generate(&context("remodeling a bathroom", Intent::Informational), &[])
        .await;
    match result.content {
        ComponentContent::Article(article) => {
            assert_eq!(article.main_content.chars().count(), 800);
            assert!(article.main_content.ends_with("..."));
        }
        other => panic!("expected article, got {:?}", other),
    }
}

#[tokio::test]
async fn test_provider_failure_becomes_fallback() {
    let stats = Arc::new(GenerationStatsLog::new());
    let cache = Arc::new(InMemoryCacheStore::new());
    let generator = ComponentGenerator::new(
        HeroStrategy::new(),
        registry_with(StaticProvider::failing("openai", ProviderError::RequestFailed("HTTP 500".into()))),
        cache.clone(),
        stats.clone(),
    );
    let ctx = context("buy bathroom vanity", Intent::Commercial);

    let result = generator.generate(&ctx, &[]).await;
    assert!(!result.success);
    assert!(result.metadata.error_occurred);
    assert!(result.metadata.ai_provider.is_none());
    assert!(result.confidence <= 0.5);
    assert!(result.content.missing_required().is_empty());
    assert!(result.error.unwrap_or_default().contains("HTTP 500"));

    // * fallbacks are neither cached nor counted
    assert!(stats.is_empty());
    assert!(cache.get(&generator.cache_key(&ctx, &[])).await.unwrap().is_none());
}

#[tokio::test]
async fn test_every_type_fills_required_fields() {
    let registry = registry_with(StaticProvider::new("openai", "{\"tags\": [\"only tags\"]}"));
    let cache = Arc::new(InMemoryCacheStore::new());
    let stats = Arc::new(GenerationStatsLog::new());
    let ctx = context("tile flooring", Intent::Educational);

    let generators: Vec<Arc<dyn ComponentGenerate>> = vec![
        Arc::new(ComponentGenerator::new(HeroStrategy::new(), registry.clone(), cache.clone(), stats.clone())),
        Arc::new(ComponentGenerator::new(ArticleStrategy::new(), registry.clone(), cache.clone(), stats.clone())),
        Arc::new(ComponentGenerator::new(CtaStrategy::new(), registry.clone(), cache.clone(), stats.clone())),
    ];

    for generator in generators {
        let result = generator.generate_component(&ctx, &[]).await;
        assert!(result.success);
        assert!(result.content.missing_required().is_empty());
        assert!((0.0..=1.0).contains(&result.confidence));
        let quality = result.metadata.quality_metrics.expect("quality metrics");
        assert!(quality.is_bounded());
        assert!(quality.completeness_score < 1.0);
    }

    let summary = stats.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_provider["openai"], 3);
}

#[tokio::test]
async fn test_no_provider_uses_fallback() {
    let generator = ComponentGenerator::new(
        CtaStrategy::new(),
        Arc::new(ProviderRegistry::new().with_provider(Arc::new(StaticProvider::unconfigured("openai")))),
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(GenerationStatsLog::new()),
    );

    let result = generator.generate(&context("tile", Intent::Navigational), &[]).await;
    assert!(result.is_fallback());
    assert!(result.error.unwrap_or_default().contains("No AI provider"));
}
