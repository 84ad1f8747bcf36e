use chrono::{Duration as ChronoDuration, Utc};
use pagecraft::cache::{compute_cache_key, CacheStore, InMemoryCacheStore, RedisCacheStore};
use pagecraft::components::{ComponentContent, ComponentMetadata, ComponentResult, HeroContent};
use pagecraft::models::{ComponentType, DiscoveryResult, Intent, IntentAnalysis, PersonalizationContext, Tone};
use std::collections::BTreeMap;
use std::time::Duration;

fn result(headline: &str, age_secs: i64) -> ComponentResult {
    ComponentResult {
        success: true,
        content: ComponentContent::Hero(HeroContent {
            headline: headline.to_string(),
            subheadline: "Sub".to_string(),
            cta_text: "Go".to_string(),
            ..Default::default()
        }),
        error: None,
        metadata: ComponentMetadata {
            component_type: ComponentType::Hero,
            ai_provider: Some("openai".to_string()),
            generation_time: 0.2,
            quality_metrics: None,
            cache_key: "k".to_string(),
            generated_at: Utc::now() - ChronoDuration::seconds(age_secs),
            error_occurred: false,
        },
        confidence: 0.8,
        from_cache: false,
    }
}

fn context(interests: &[(&str, f64)]) -> PersonalizationContext {
    let mut map = BTreeMap::new();
    for (topic, score) in interests {
        map.insert(topic.to_string(), *score);
    }
    PersonalizationContext::new("bathroom tile", IntentAnalysis::new(Intent::Commercial, 0.9, vec![]))
        .with_interests(map)
}

fn results(n: usize) -> Vec<DiscoveryResult> {
    (0..n)
        .map(|i| DiscoveryResult::new(&format!("R{}", i), &format!("https://x.y/{}", i), 0.5))
        .collect()
}

#[test]
fn test_key_ignores_interest_insertion_order_and_unrelated_fields() {
    let a = context(&[("design", 0.4), ("budgeting", 0.9)]);
    let b = context(&[("budgeting", 0.9), ("design", 0.4)]).with_tone(Tone::Friendly);
    assert_eq!(
        compute_cache_key(ComponentType::Hero, &a, &results(3), 5),
        compute_cache_key(ComponentType::Hero, &b, &results(3), 5)
    );
}

#[test]
fn test_key_only_uses_first_results() {
    let ctx = context(&[]);
    let mut longer = results(5);
    longer.push(DiscoveryResult::new("Extra", "https://x.y/extra", 0.1));
    assert_eq!(
        compute_cache_key(ComponentType::Article, &ctx, &results(5), 5),
        compute_cache_key(ComponentType::Article, &ctx, &longer, 5)
    );
    assert_ne!(
        compute_cache_key(ComponentType::Article, &ctx, &results(4), 5),
        compute_cache_key(ComponentType::Article, &ctx, &results(5), 5)
    );
}

#[test]
fn test_key_changes_with_interest_scores() {
    let a = context(&[("design", 0.4)]);
    let b = context(&[("design", 0.5)]);
    assert_ne!(
        compute_cache_key(ComponentType::Cta, &a, &[], 5),
        compute_cache_key(ComponentType::Cta, &b, &[], 5)
    );
}

#[tokio::test]
async fn test_entry_expires_by_age() {
    let store = InMemoryCacheStore::new();
    store.set("fresh", &result("Fresh", 0), Duration::from_secs(60)).await.unwrap();
    store.set("stale", &result("Stale", 120), Duration::from_secs(60)).await.unwrap();

    assert!(store.get("fresh").await.unwrap().is_some());
    assert!(store.get("stale").await.unwrap().is_none());
    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_invalidate_and_clear() {
    let store = InMemoryCacheStore::new();
    store.set("a", &result("A", 0), Duration::from_secs(60)).await.unwrap();
    store.set("b", &result("B", 0), Duration::from_secs(60)).await.unwrap();

    assert!(store.invalidate("a").await.unwrap());
    assert!(!store.invalidate("a").await.unwrap());
    store.clear().await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_last_write_wins_and_capacity() {
    let store = InMemoryCacheStore::with_capacity(2);
    store.set("a", &result("First", 0), Duration::from_secs(60)).await.unwrap();
    store.set("a", &result("Second", 0), Duration::from_secs(60)).await.unwrap();
    let hit = store.get("a").await.unwrap().unwrap();
    assert_eq!(hit.content.title(), "Second");

    tokio::time::sleep(Duration::from_millis(5)).await;
    store.set("b", &result("B", 0), Duration::from_secs(60)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.set("c", &result("C", 0), Duration::from_secs(60)).await.unwrap();
    assert_eq!(store.len().await, 2);
    assert!(store.get("a").await.unwrap().is_none());
}

#[test]
fn test_redis_entry_key_format() {
    assert_eq!(RedisCacheStore::entry_key("hero:00ff"), "pagecraft:component:hero:00ff");
}
