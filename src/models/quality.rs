// * Quality metrics shared by component- and page-level scoring

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clamps a score into [0, 1]; NaN collapses to 0
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Heuristic quality breakdown; every field lies in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityMetrics {
    pub overall_confidence: f64,
    pub content_relevance: f64,
    pub personalization_score: f64,
    pub completeness_score: f64,
    #[serde(default)]
    pub component_scores: BTreeMap<String, f64>,
}

impl QualityMetrics {
    /// Builds metrics with every score clamped
    pub fn new(
        overall_confidence: f64,
        content_relevance: f64,
        personalization_score: f64,
        completeness_score: f64,
    ) -> Self {
        Self {
            overall_confidence: clamp_score(overall_confidence),
            content_relevance: clamp_score(content_relevance),
            personalization_score: clamp_score(personalization_score),
            completeness_score: clamp_score(completeness_score),
            component_scores: BTreeMap::new(),
        }
    }

    /// Records a per-component score (clamped)
    pub fn with_component_score(mut self, component: &str, score: f64) -> Self {
        self.component_scores
            .insert(component.to_string(), clamp_score(score));
        self
    }

    /// True if every score is inside [0, 1]
    pub fn is_bounded(&self) -> bool {
        let bounded = |v: f64| (0.0..=1.0).contains(&v);
        bounded(self.overall_confidence)
            && bounded(self.content_relevance)
            && bounded(self.personalization_score)
            && bounded(self.completeness_score)
            && self.component_scores.values().all(|v| bounded(*v))
    }
}
