// * Usage & cost accounting: monthly rollups keyed by (YYYY-MM, model)
// * Sinks are injected; the tracker never fails a generation

use crate::network::provider::TokenUsage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

// * Redis hash prefix: usage:<month>:<model>
const USAGE_KEY_PREFIX: &str = "usage";

// * USD per 1K tokens (prompt, completion); longest matching model prefix wins
const DEFAULT_PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.000_15, 0.000_6),
    ("gpt-4o", 0.002_5, 0.01),
    ("gpt-4", 0.03, 0.06),
    ("gpt-3.5", 0.000_5, 0.001_5),
    ("claude-3-5-haiku", 0.000_8, 0.004),
    ("claude-3-5-sonnet", 0.003, 0.015),
    ("claude-3-haiku", 0.000_25, 0.001_25),
    ("claude-3-opus", 0.015, 0.075),
    ("gemini-1.5-flash", 0.000_075, 0.000_3),
    ("gemini-1.5-pro", 0.001_25, 0.005),
];

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Usage sink poisoned")]
    Poisoned,
}

/// Aggregated usage for one month and model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRollup {
    pub requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost_usd: f64,
}

impl UsageRollup {
    fn add(&mut self, usage: &TokenUsage, cost: f64) {
        self.requests += 1;
        self.prompt_tokens += usage.prompt_tokens as u64;
        self.completion_tokens += usage.completion_tokens as u64;
        self.total_tokens += usage.total_tokens as u64;
        self.estimated_cost_usd += cost;
    }
}

/// Per-model price, USD per 1K tokens
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrice {
    pub model_prefix: String,
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

/// Destination for usage increments
#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn add(
        &self,
        month: &str,
        model: &str,
        usage: &TokenUsage,
        cost_usd: f64,
    ) -> Result<(), UsageError>;
}

/// In-memory usage sink (for tests and single-process runs)
#[derive(Debug, Default)]
pub struct InMemoryUsageSink {
    rollups: Mutex<BTreeMap<(String, String), UsageRollup>>,
}

impl InMemoryUsageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rollup for one month and model, if any usage was recorded
    pub fn rollup(&self, month: &str, model: &str) -> Option<UsageRollup> {
        self.rollups
            .lock()
            .ok()?
            .get(&(month.to_string(), model.to_string()))
            .cloned()
    }

    /// All rollups ordered by (month, model)
    pub fn snapshot(&self) -> Vec<((String, String), UsageRollup)> {
        match self.rollups.lock() {
            Ok(guard) => guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl UsageSink for InMemoryUsageSink {
    async fn add(
        &self,
        month: &str,
        model: &str,
        usage: &TokenUsage,
        cost_usd: f64,
    ) -> Result<(), UsageError> {
        let mut guard = self.rollups.lock().map_err(|_| UsageError::Poisoned)?;
        guard
            .entry((month.to_string(), model.to_string()))
            .or_default()
            .add(usage, cost_usd);
        Ok(())
    }
}

/// Redis-backed usage sink: one hash per month and model
pub struct RedisUsageSink {
    redis: ConnectionManager,
}

impl RedisUsageSink {
    pub async fn new(redis_url: &str) -> Result<Self, UsageError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self { redis })
    }

    /// Hash key for a month and model
    pub fn usage_key(month: &str, model: &str) -> String {
        format!("{}:{}:{}", USAGE_KEY_PREFIX, month, model)
    }
}

#[async_trait]
impl UsageSink for RedisUsageSink {
    async fn add(
        &self,
        month: &str,
        model: &str,
        usage: &TokenUsage,
        cost_usd: f64,
    ) -> Result<(), UsageError> {
        let key = Self::usage_key(month, model);
        let mut redis = self.redis.clone();

        redis::pipe()
            .atomic()
            .hincr(&key, "requests", 1i64)
            .ignore()
            .hincr(&key, "prompt_tokens", usage.prompt_tokens as i64)
            .ignore()
            .hincr(&key, "completion_tokens", usage.completion_tokens as i64)
            .ignore()
            .hincr(&key, "total_tokens", usage.total_tokens as i64)
            .ignore()
            .hincr(&key, "estimated_cost_usd", cost_usd)
            .ignore()
            .query_async::<_, ()>(&mut redis)
            .await?;

        Ok(())
    }
}

/// Records provider usage into a sink with estimated cost
pub struct UsageTracker {
    sink: Arc<dyn UsageSink>,
    prices: Vec<ModelPrice>,
}

impl UsageTracker {
    /// Creates a tracker with the built-in price table
    pub fn new(sink: Arc<dyn UsageSink>) -> Self {
        let prices = DEFAULT_PRICES
            .iter()
            .map(|(prefix, prompt, completion)| ModelPrice {
                model_prefix: prefix.to_string(),
                prompt_per_1k: *prompt,
                completion_per_1k: *completion,
            })
            .collect();
        Self { sink, prices }
    }

    /// Tracker backed by a fresh in-memory sink
    pub fn in_memory() -> (Self, Arc<InMemoryUsageSink>) {
        let sink = Arc::new(InMemoryUsageSink::new());
        (Self::new(sink.clone()), sink)
    }

    /// Adds or replaces the price for a model prefix
    pub fn with_price(mut self, price: ModelPrice) -> Self {
        self.prices.retain(|p| p.model_prefix != price.model_prefix);
        self.prices.push(price);
        self
    }

    /// Estimated USD cost; unknown models cost 0
    pub fn estimate_cost(&self, model: &str, usage: &TokenUsage) -> f64 {
        let price = self
            .prices
            .iter()
            .filter(|p| model.starts_with(&p.model_prefix))
            .max_by_key(|p| p.model_prefix.len());

        match price {
            Some(p) => {
                (usage.prompt_tokens as f64 / 1000.0) * p.prompt_per_1k
                    + (usage.completion_tokens as f64 / 1000.0) * p.completion_per_1k
            }
            None => 0.0,
        }
    }

    /// Records one successful call for the current month
    pub async fn record(&self, provider: &str, model: &str, usage: &TokenUsage) {
        self.record_at(Utc::now(), provider, model, usage).await;
    }

    /// Records one successful call for the month containing `at`
    pub async fn record_at(
        &self,
        at: DateTime<Utc>,
        provider: &str,
        model: &str,
        usage: &TokenUsage,
    ) {
        let month = month_key(at);
        let cost = self.estimate_cost(model, usage);

        if let Err(e) = self.sink.add(&month, model, usage, cost).await {
            tracing::warn!(
                provider = provider,
                model = model,
                error = %e,
                "Failed to record provider usage"
            );
        }
    }
}

/// Calendar month key (`YYYY-MM`)
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}
