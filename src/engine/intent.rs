// * Intent Analyzer
// * Classifies a search query with weighted keyword patterns

use crate::models::{Intent, IntentAnalysis};
use crate::quality::significant_words;
use regex::Regex;
use std::sync::LazyLock;

// * Confidence when no pattern matches
const BASE_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

// * Confidence gained per point of winning score, and for dominance over the rest
const SCORE_STEP: f64 = 0.1;
const DOMINANCE_WEIGHT: f64 = 0.2;

const KEYWORD_LIMIT: usize = 10;

static COMMERCIAL_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(buy|buying|purchase|order|shop|shopping)\b").expect("Invalid commercial action regex")
});

static COMMERCIAL_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(price|prices|pricing|cost|costs|cheap|deal|deals|discount|sale|coupon|affordable|best|top|review|reviews|vs|versus|compare)\b",
    )
    .expect("Invalid commercial signal regex")
});

static EDUCATIONAL_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhow\s+(to|do|does|can|should)\b").expect("Invalid educational question regex")
});

static EDUCATIONAL_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(learn|learning|tutorial|guide|course|lesson|lessons|step by step|steps|diy|fix|repair|install|beginner|beginners)\b",
    )
    .expect("Invalid educational signal regex")
});

static NAVIGATIONAL_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(login|log in|sign in|signin|website|official|homepage|near me|contact|location|hours|directions)\b",
    )
    .expect("Invalid navigational regex")
});

static NAVIGATIONAL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9-]+\.(com|org|net|io|co|dev)\b").expect("Invalid domain regex")
});

static INFORMATIONAL_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(what|why|who|when|where|which|history|meaning|definition|facts|ideas|examples|types|benefits)\b",
    )
    .expect("Invalid informational regex")
});

/// Scores per intent for one query
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntentScores {
    pub commercial: f64,
    pub educational: f64,
    pub navigational: f64,
    pub informational: f64,
}

impl IntentScores {
    pub fn get(&self, intent: Intent) -> f64 {
        match intent {
            Intent::Commercial => self.commercial,
            Intent::Educational => self.educational,
            Intent::Navigational => self.navigational,
            Intent::Informational => self.informational,
        }
    }

    pub fn total(&self) -> f64 {
        self.commercial + self.educational + self.navigational + self.informational
    }
}

fn weighted_matches(pattern: &Regex, query: &str, weight: f64) -> f64 {
    pattern.find_iter(query).count() as f64 * weight
}

/// Keyword/heuristic intent classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentAnalyzer;

impl IntentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Weighted match counts for each intent
    pub fn score(&self, query: &str) -> IntentScores {
        let weighted = |pattern: &Regex, weight: f64| weighted_matches(pattern, query, weight);

        IntentScores {
            commercial: weighted(&*COMMERCIAL_ACTION, 2.0) + weighted(&*COMMERCIAL_SIGNAL, 1.0),
            educational: weighted(&*EDUCATIONAL_QUESTION, 2.0) + weighted(&*EDUCATIONAL_SIGNAL, 1.0),
            navigational: weighted(&*NAVIGATIONAL_SIGNAL, 2.0) + weighted(&*NAVIGATIONAL_DOMAIN, 2.0),
            informational: weighted(&*INFORMATIONAL_SIGNAL, 1.0),
        }
    }

    /// Classifies `query`; unmatched queries are informational at base confidence
    pub fn analyze(&self, query: &str) -> IntentAnalysis {
        let scores = self.score(query);
        let total = scores.total();
        let keywords: Vec<String> = significant_words(query).into_iter().take(KEYWORD_LIMIT).collect();

        if total <= 0.0 {
            tracing::debug!(query = %query, "No intent signal, defaulting to informational");
            return IntentAnalysis::new(Intent::Informational, BASE_CONFIDENCE, keywords);
        }

        // * Strictly greater keeps the earlier intent on ties
        let mut primary = Intent::ALL[0];
        for intent in Intent::ALL {
            if scores.get(intent) > scores.get(primary) {
                primary = intent;
            }
        }

        let top = scores.get(primary);
        let confidence =
            (BASE_CONFIDENCE + SCORE_STEP * top + DOMINANCE_WEIGHT * (top / total)).min(MAX_CONFIDENCE);

        tracing::debug!(
            query = %query,
            intent = primary.as_str(),
            confidence = confidence,
            "Intent classified"
        );
        IntentAnalysis::new(primary, confidence, keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentType;

    #[test]
    fn test_how_to_is_educational() {
        let analysis = IntentAnalyzer::new().analyze("how to fix a leaky faucet");
        assert_eq!(analysis.primary_intent, Intent::Educational);
        assert!(analysis.confidence > 0.5);
        assert!(analysis.confidence <= 0.95);
    }

    #[test]
    fn test_buy_is_commercial() {
        let analysis = IntentAnalyzer::new().analyze("buy bathroom vanity");
        assert_eq!(analysis.primary_intent, Intent::Commercial);
        assert_eq!(analysis.suggested_components[1], ComponentType::Cta);
    }

    #[test]
    fn test_domain_is_navigational() {
        let analysis = IntentAnalyzer::new().analyze("homedepot.com");
        assert_eq!(analysis.primary_intent, Intent::Navigational);
    }

    #[test]
    fn test_no_signal_defaults_informational() {
        let analysis = IntentAnalyzer::new().analyze("remodeling a bathroom");
        assert_eq!(analysis.primary_intent, Intent::Informational);
        assert_eq!(analysis.confidence, 0.5);
        assert!(analysis.keywords.contains(&"bathroom".to_string()));
    }

    #[test]
    fn test_tie_prefers_commercial() {
        // * one commercial signal, one educational signal
        let scores = IntentAnalyzer::new().score("best tutorial");
        assert_eq!(scores.commercial, scores.educational);
        let analysis = IntentAnalyzer::new().analyze("best tutorial");
        assert_eq!(analysis.primary_intent, Intent::Commercial);
    }
}
