// * Component cache store: trait seam plus the in-memory backend

use crate::components::ComponentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::constants::DEFAULT_CACHE_MAX_ENTRIES;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Returns true when `generated_at` is at least `ttl` old
pub fn is_expired(generated_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(generated_at);
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => age >= ttl,
        Err(_) => false,
    }
}

/// Key/value store for component results
///
/// Readers must treat errors as misses. Concurrent writers race; the last write wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the entry unless absent or expired
    async fn get(&self, key: &str) -> Result<Option<ComponentResult>, CacheError>;

    async fn set(&self, key: &str, value: &ComponentResult, ttl: Duration)
        -> Result<(), CacheError>;

    /// Removes one entry; returns whether it existed
    async fn invalidate(&self, key: &str) -> Result<bool, CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    /// Drops expired entries; returns how many were removed
    async fn purge_expired(&self) -> Result<usize, CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ComponentResult,
    ttl: Duration,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.value.metadata.generated_at, self.ttl, now)
    }
}

/// Bounded in-process cache; the oldest entry is evicted when full
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<ComponentResult>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(Utc::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &ComponentResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                tracing::debug!(evicted = %oldest, "Cache full, evicted oldest entry");
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                ttl,
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ComponentContent, ComponentMetadata, CtaContent};
    use crate::models::ComponentType;

    fn result(headline: &str, generated_at: DateTime<Utc>) -> ComponentResult {
        ComponentResult {
            success: true,
            content: ComponentContent::Cta(CtaContent {
                headline: headline.to_string(),
                ..Default::default()
            }),
            error: None,
            metadata: ComponentMetadata {
                component_type: ComponentType::Cta,
                ai_provider: Some("static".into()),
                generation_time: 0.01,
                quality_metrics: None,
                cache_key: headline.to_string(),
                generated_at,
                error_occurred: false,
            },
            confidence: 0.8,
            from_cache: false,
        }
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc::now();
        let ttl = Duration::from_secs(3600);
        assert!(!is_expired(now - chrono::Duration::seconds(3599), ttl, now));
        assert!(is_expired(now - chrono::Duration::seconds(3600), ttl, now));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = InMemoryCacheStore::new();
        store
            .set("k", &result("A", Utc::now()), Duration::from_secs(60))
            .await
            .unwrap();
        let hit = store.get("k").await.unwrap().unwrap();
        assert_eq!(hit.content.title(), "A");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let store = InMemoryCacheStore::new();
        let old = Utc::now() - chrono::Duration::seconds(7200);
        store
            .set("k", &result("A", old), Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemoryCacheStore::new();
        let ttl = Duration::from_secs(60);
        store.set("k", &result("first", Utc::now()), ttl).await.unwrap();
        store.set("k", &result("second", Utc::now()), ttl).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap().content.title(), "second");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = InMemoryCacheStore::with_capacity(2);
        let ttl = Duration::from_secs(60);
        store.set("a", &result("a", Utc::now()), ttl).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.set("b", &result("b", Utc::now()), ttl).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.set("c", &result("c", Utc::now()), ttl).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let store = InMemoryCacheStore::new();
        let ttl = Duration::from_secs(60);
        store.set("a", &result("a", Utc::now()), ttl).await.unwrap();
        store.set("b", &result("b", Utc::now()), ttl).await.unwrap();

        assert!(store.invalidate("a").await.unwrap());
        assert!(!store.invalidate("a").await.unwrap());
        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }
}
