// * Bounded in-memory log of successful generations

use crate::config::constants::DEFAULT_STATS_LOG_CAPACITY;
use crate::models::ComponentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// One successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStat {
    pub component_type: ComponentType,
    /// Seconds
    pub generation_time: f64,
    pub confidence: f64,
    pub provider: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatsSummary {
    pub count: usize,
    pub average_confidence: f64,
    pub average_generation_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatsSummary {
    pub total: usize,
    pub by_component: BTreeMap<String, ComponentStatsSummary>,
    pub by_provider: BTreeMap<String, usize>,
}

/// Ring buffer of generation stats; the oldest entry is dropped when full
#[derive(Debug)]
pub struct GenerationStatsLog {
    entries: Mutex<VecDeque<GenerationStat>>,
    capacity: usize,
}

impl GenerationStatsLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STATS_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn record(&self, stat: GenerationStat) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(stat);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the log, oldest first
    pub fn entries(&self) -> Vec<GenerationStat> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Per-component averages and per-provider counts
    pub fn summary(&self) -> GenerationStatsSummary {
        let entries = self.entries();
        let mut summary = GenerationStatsSummary {
            total: entries.len(),
            ..Default::default()
        };

        let mut sums: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
        for stat in &entries {
            let slot = sums
                .entry(stat.component_type.as_str().to_string())
                .or_insert((0, 0.0, 0.0));
            slot.0 += 1;
            slot.1 += stat.confidence;
            slot.2 += stat.generation_time;

            *summary.by_provider.entry(stat.provider.clone()).or_insert(0) += 1;
        }

        summary.by_component = sums
            .into_iter()
            .map(|(component, (count, confidence, time))| {
                (
                    component,
                    ComponentStatsSummary {
                        count,
                        average_confidence: confidence / count as f64,
                        average_generation_time: time / count as f64,
                    },
                )
            })
            .collect();

        summary
    }
}

impl Default for GenerationStatsLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(component_type: ComponentType, provider: &str, confidence: f64) -> GenerationStat {
        GenerationStat {
            component_type,
            generation_time: 1.0,
            confidence,
            provider: provider.to_string(),
            query: "tile".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = GenerationStatsLog::with_capacity(2);
        log.record(stat(ComponentType::Hero, "a", 0.1));
        log.record(stat(ComponentType::Hero, "b", 0.2));
        log.record(stat(ComponentType::Hero, "c", 0.3));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].provider, "b");
    }

    #[test]
    fn test_summary() {
        let log = GenerationStatsLog::new();
        log.record(stat(ComponentType::Hero, "openai", 0.6));
        log.record(stat(ComponentType::Hero, "anthropic", 0.8));
        log.record(stat(ComponentType::Cta, "openai", 0.5));

        let summary = log.summary();
        assert_eq!(summary.total, 3);
        let hero = &summary.by_component["hero"];
        assert_eq!(hero.count, 2);
        assert!((hero.average_confidence - 0.7).abs() < 1e-9);
        assert_eq!(summary.by_provider["openai"], 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = GenerationStatsLog::new().summary();
        assert_eq!(summary.total, 0);
        assert!(summary.by_component.is_empty());
    }
}
