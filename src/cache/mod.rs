// * Component cache: deterministic keys, TTL expiry, in-memory and Redis backends

pub mod key;
pub mod redis_store;
pub mod store;

pub use key::{compute_cache_key, discovery_fingerprint, interests_fingerprint};
pub use redis_store::RedisCacheStore;
pub use store::{is_expired, CacheError, CacheStore, InMemoryCacheStore};
