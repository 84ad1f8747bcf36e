// * Heuristic quality scoring for components and pages
// * Every score is clamped to [0.0, 1.0]

use crate::models::{clamp_score, QualityMetrics};
use std::collections::BTreeMap;

// * Component overall = weighted relevance, personalization and completeness
const WEIGHT_RELEVANCE: f64 = 0.4;
const WEIGHT_PERSONALIZATION: f64 = 0.3;
const WEIGHT_COMPLETENESS: f64 = 0.3;

// * Page confidence weights
const PAGE_WEIGHT_MEAN: f64 = 0.4;
const PAGE_WEIGHT_RELEVANCE: f64 = 0.3;
const PAGE_WEIGHT_PERSONALIZATION: f64 = 0.2;
const PAGE_WEIGHT_COMPLETENESS: f64 = 0.1;

/// Personalization score used when a strategy has nothing better
pub const DEFAULT_PERSONALIZATION_SCORE: f64 = 0.7;

// * Interest-mention score floor; content that mentions no interest still
// * reflects the tone/complexity adjustments
const INTEREST_MENTION_FLOOR: f64 = 0.4;

// * Query words of this length or shorter are ignored for relevance
const MIN_SIGNIFICANT_WORD_LEN: usize = 2;

/// Lowercased query words longer than two characters, first occurrence order
pub fn significant_words(query: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > MIN_SIGNIFICANT_WORD_LEN)
    {
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// Fraction of significant query words literally present in `text`
///
/// A query without significant words scores 0.
pub fn content_relevance(query: &str, text: &str) -> f64 {
    let words = significant_words(query);
    if words.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let found = words.iter().filter(|w| haystack.contains(w.as_str())).count();
    clamp_score(found as f64 / words.len() as f64)
}

/// Interest-weighted mention score; default when there are no interests
pub fn interest_mention_score(interests: &BTreeMap<String, f64>, text: &str) -> f64 {
    let total: f64 = interests.values().copied().filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        return DEFAULT_PERSONALIZATION_SCORE;
    }

    let haystack = text.to_lowercase();
    let mentioned: f64 = interests
        .iter()
        .filter(|(_, score)| **score > 0.0)
        .filter(|(topic, _)| haystack.contains(&topic.to_lowercase().replace('_', " ")))
        .map(|(_, score)| *score)
        .sum();

    clamp_score(INTEREST_MENTION_FLOOR + (1.0 - INTEREST_MENTION_FLOOR) * (mentioned / total))
}

/// `0.4*relevance + 0.3*personalization + 0.3*completeness`
pub fn overall_confidence(relevance: f64, personalization: f64, completeness: f64) -> f64 {
    clamp_score(
        WEIGHT_RELEVANCE * clamp_score(relevance)
            + WEIGHT_PERSONALIZATION * clamp_score(personalization)
            + WEIGHT_COMPLETENESS * clamp_score(completeness),
    )
}

/// Quality metrics for one component
pub fn score_component(
    query: &str,
    flattened_text: &str,
    personalization: f64,
    completeness: f64,
) -> QualityMetrics {
    let relevance = content_relevance(query, flattened_text);
    QualityMetrics::new(
        overall_confidence(relevance, personalization, completeness),
        relevance,
        personalization,
        completeness,
    )
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    clamp_score(values.iter().sum::<f64>() / values.len() as f64)
}

/// `0.4*mean + 0.3*relevance + 0.2*personalization + 0.1*completeness`
pub fn page_confidence(
    mean_confidence: f64,
    relevance: f64,
    personalization: f64,
    completeness: f64,
) -> f64 {
    clamp_score(
        PAGE_WEIGHT_MEAN * clamp_score(mean_confidence)
            + PAGE_WEIGHT_RELEVANCE * clamp_score(relevance)
            + PAGE_WEIGHT_PERSONALIZATION * clamp_score(personalization)
            + PAGE_WEIGHT_COMPLETENESS * clamp_score(completeness),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significant_words() {
        assert_eq!(
            significant_words("How to fix a leaky faucet, fix it"),
            vec!["how", "fix", "leaky", "faucet"]
        );
        assert!(significant_words("a an of").is_empty());
    }

    #[test]
    fn test_content_relevance_fraction() {
        let score = content_relevance("buy bathroom vanity", "Shop a Bathroom sink today");
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(content_relevance("a b", "anything"), 0.0);
    }

    #[test]
    fn test_interest_mention_default_without_interests() {
        assert_eq!(
            interest_mention_score(&BTreeMap::new(), "text"),
            DEFAULT_PERSONALIZATION_SCORE
        );
    }

    #[test]
    fn test_interest_mention_weighted() {
        let mut interests = BTreeMap::new();
        interests.insert("home_improvement".to_string(), 0.75);
        interests.insert("cooking".to_string(), 0.25);

        let full = interest_mention_score(&interests, "A home improvement guide about cooking");
        let partial = interest_mention_score(&interests, "A Home Improvement guide");
        let none = interest_mention_score(&interests, "Unrelated");

        assert!((full - 1.0).abs() < 1e-9);
        assert!((partial - (0.4 + 0.6 * 0.75)).abs() < 1e-9);
        assert!((none - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_overall_formula() {
        let score = overall_confidence(1.0, 0.7, 0.5);
        assert!((score - (0.4 + 0.21 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn test_scores_clamped() {
        assert_eq!(overall_confidence(5.0, 5.0, 5.0), 1.0);
        assert_eq!(page_confidence(-1.0, f64::NAN, 0.0, 0.0), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_score_component_bounded() {
        let metrics = score_component("tile flooring", "Tile flooring guide", 0.7, 1.0);
        assert!(metrics.is_bounded());
        assert_eq!(metrics.content_relevance, 1.0);
    }
}
