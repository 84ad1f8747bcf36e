// * Session interest vector: collaborator store, local cache, query-derived boosts

use crate::config::constants::INTEREST_MAX_SESSIONS;
use crate::config::EngineConfig;
use crate::quality::significant_words;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

// * Query keyword -> interest topic
const KEYWORD_INTERESTS: &[(&str, &str)] = &[
    ("bathroom", "home_improvement"),
    ("kitchen", "home_improvement"),
    ("remodel", "home_improvement"),
    ("remodeling", "home_improvement"),
    ("renovation", "home_improvement"),
    ("faucet", "home_improvement"),
    ("tile", "home_improvement"),
    ("flooring", "home_improvement"),
    ("vanity", "home_improvement"),
    ("diy", "diy"),
    ("fix", "diy"),
    ("repair", "diy"),
    ("install", "diy"),
    ("laptop", "technology"),
    ("phone", "technology"),
    ("computer", "technology"),
    ("software", "technology"),
    ("programming", "technology"),
    ("recipe", "cooking"),
    ("recipes", "cooking"),
    ("cook", "cooking"),
    ("garden", "gardening"),
    ("gardening", "gardening"),
    ("plants", "gardening"),
    ("budget", "budgeting"),
    ("cheap", "budgeting"),
    ("price", "budgeting"),
    ("travel", "travel"),
    ("hotel", "travel"),
    ("flight", "travel"),
    ("fitness", "health"),
    ("workout", "health"),
    ("health", "health"),
];

#[derive(Debug, Error)]
pub enum InterestStoreError {
    #[error("Interest store unavailable: {0}")]
    Unavailable(String),
}

/// Session/interest collaborator
#[async_trait]
pub trait InterestStore: Send + Sync {
    /// Interest vector of a session; empty when unknown or expired
    async fn load(&self, session_id: &str) -> Result<BTreeMap<String, f64>, InterestStoreError>;

    async fn store(
        &self,
        session_id: &str,
        interests: &BTreeMap<String, f64>,
        ttl: Duration,
    ) -> Result<(), InterestStoreError>;
}

/// Session id -> (interest vector, expires_at), bounded
struct SessionMap {
    entries: HashMap<String, (BTreeMap<String, f64>, Instant)>,
    max_entries: usize,
}

impl SessionMap {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    fn get(&self, session_id: &str, now: Instant) -> Option<&BTreeMap<String, f64>> {
        self.entries
            .get(session_id)
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(interests, _)| interests)
    }

    // * Expired entries go first; when still full the entry closest to expiry is evicted
    fn insert(&mut self, session_id: &str, interests: BTreeMap<String, f64>, expires_at: Instant) {
        let now = Instant::now();
        if !self.entries.contains_key(session_id) && self.entries.len() >= self.max_entries {
            self.entries.retain(|_, (_, expires)| now < *expires);
            if self.entries.len() >= self.max_entries {
                let soonest = self
                    .entries
                    .iter()
                    .min_by_key(|(_, (_, expires))| *expires)
                    .map(|(k, _)| k.clone());
                if let Some(soonest) = soonest {
                    self.entries.remove(&soonest);
                }
            }
        }
        self.entries
            .insert(session_id.to_string(), (interests, expires_at));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Process-local interest store with per-session expiry
pub struct InMemoryInterestStore {
    sessions: RwLock<SessionMap>,
}

impl InMemoryInterestStore {
    pub fn new() -> Self {
        Self::with_capacity(INTEREST_MAX_SESSIONS)
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(SessionMap::new(max_sessions)),
        }
    }

    /// Seeds a session without an expiry check on the way in
    pub async fn seed(&self, session_id: &str, interests: BTreeMap<String, f64>, ttl: Duration) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, interests, Instant::now() + ttl);
    }

    /// Stored sessions, expired ones included until evicted
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryInterestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterestStore for InMemoryInterestStore {
    async fn load(&self, session_id: &str) -> Result<BTreeMap<String, f64>, InterestStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id, Instant::now())
            .cloned()
            .unwrap_or_default())
    }

    async fn store(
        &self,
        session_id: &str,
        interests: &BTreeMap<String, f64>,
        ttl: Duration,
    ) -> Result<(), InterestStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, interests.clone(), Instant::now() + ttl);
        Ok(())
    }
}

/// Adds `boost` to every interest the query's keywords map to, capped at 1.0
pub fn apply_query_signals(interests: &mut BTreeMap<String, f64>, query: &str, boost: f64) {
    let mut matched: Vec<&str> = Vec::new();
    for word in significant_words(query) {
        for (keyword, topic) in KEYWORD_INTERESTS {
            if *keyword == word && !matched.contains(topic) {
                matched.push(*topic);
            }
        }
    }

    for topic in matched {
        let entry = interests.entry(topic.to_string()).or_insert(0.0);
        *entry = (*entry + boost).clamp(0.0, 1.0);
    }
}

/// Loads, merges and writes back the interest vector for one request
pub struct InterestResolver {
    store: Arc<dyn InterestStore>,
    local: RwLock<SessionMap>,
    local_ttl: Duration,
    store_ttl: Duration,
    query_boost: f64,
}

impl InterestResolver {
    pub fn new(store: Arc<dyn InterestStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            local: RwLock::new(SessionMap::new(INTEREST_MAX_SESSIONS)),
            local_ttl: Duration::from_secs(config.interest_cache_secs),
            store_ttl: Duration::from_secs(config.interest_ttl_secs),
            query_boost: config.interest_query_boost,
        }
    }

    // * Local cache first, then the collaborator; store failures yield an empty vector
    async fn session_interests(&self, session_id: &str) -> BTreeMap<String, f64> {
        if let Some(interests) = self.local.read().await.get(session_id, Instant::now()) {
            return interests.clone();
        }

        match self.store.load(session_id).await {
            Ok(interests) => interests,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Interest load failed");
                BTreeMap::new()
            }
        }
    }

    /// Local session vectors, expired ones included until evicted
    pub async fn cached_sessions(&self) -> usize {
        self.local.read().await.len()
    }

    /// Session vector, explicit caller interests on top, then query boosts
    ///
    /// Only the session vector is cached and written back; query boosts
    /// apply to the returned copy.
    pub async fn resolve(
        &self,
        session_id: Option<&str>,
        query: &str,
        explicit: &BTreeMap<String, f64>,
    ) -> BTreeMap<String, f64> {
        let mut session = match session_id {
            Some(id) => self.session_interests(id).await,
            None => BTreeMap::new(),
        };

        for (topic, score) in explicit {
            if score.is_finite() {
                session.insert(topic.clone(), score.clamp(0.0, 1.0));
            }
        }

        if let Some(id) = session_id {
            self.local
                .write()
                .await
                .insert(id, session.clone(), Instant::now() + self.local_ttl);
            if let Err(e) = self.store.store(id, &session, self.store_ttl).await {
                tracing::warn!(session_id = %id, error = %e, "Interest write-back failed");
            }
        }

        let mut interests = session;
        apply_query_signals(&mut interests, query, self.query_boost);

        tracing::debug!(
            session_id = session_id.unwrap_or("-"),
            interest_count = interests.len(),
            "Interest vector resolved"
        );
        interests
    }
}
