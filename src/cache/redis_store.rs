// * Redis-backed component cache
// * Entries are JSON with the TTL mirrored into SET EX; age is rechecked on read

use crate::cache::store::{is_expired, CacheError, CacheStore};
use crate::components::ComponentResult;
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// * Redis key prefix for component entries
const COMPONENT_PREFIX: &str = "pagecraft:component";

// * Keys per DEL during clear
const CLEAR_BATCH: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    ttl_secs: u64,
    value: ComponentResult,
}

pub struct RedisCacheStore {
    redis: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self { redis })
    }

    /// Namespaced Redis key for a cache key
    pub fn entry_key(key: &str) -> String {
        format!("{}:{}", COMPONENT_PREFIX, key)
    }

    /// SCAN pattern covering every component entry
    pub fn scan_pattern() -> String {
        format!("{}:*", COMPONENT_PREFIX)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<ComponentResult>, CacheError> {
        let mut redis = self.redis.clone();
        let raw: Option<String> = redis.get(Self::entry_key(key)).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let entry: StoredEntry = serde_json::from_str(&raw)?;
        let ttl = Duration::from_secs(entry.ttl_secs);

        if is_expired(entry.value.metadata.generated_at, ttl, Utc::now()) {
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(
        &self,
        key: &str,
        value: &ComponentResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let ttl_secs = ttl.as_secs();
        // * EX 0 is rejected by Redis; a zero TTL entry would be expired anyway
        if ttl_secs == 0 {
            return Ok(());
        }

        let payload = serde_json::to_string(&StoredEntry {
            ttl_secs,
            value: value.clone(),
        })?;
        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::entry_key(key))
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut redis)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let mut redis = self.redis.clone();
        let removed: u64 = redis.del(Self::entry_key(key)).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        // * Incremental SCAN rather than KEYS
        let mut scanner = self.redis.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = scanner.scan_match::<_, String>(Self::scan_pattern()).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut redis = self.redis.clone();
        for batch in keys.chunks(CLEAR_BATCH) {
            redis.del::<_, ()>(batch).await?;
        }
        tracing::debug!(removed = keys.len(), "Redis component cache cleared");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        // * Redis expires keys itself
        Ok(0)
    }
}
