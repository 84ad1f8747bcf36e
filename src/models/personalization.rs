// * Personalization records: discovery input, caller-supplied user context
// * and the read-only PersonalizationContext shared with every generator

use crate::models::search::{Intent, IntentAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate piece of existing content surfaced by the discovery collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DiscoveryResult {
    pub fn new(title: &str, url: &str, relevance_score: f64) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            excerpt: String::new(),
            category: String::new(),
            relevance_score,
            tags: Vec::new(),
        }
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Tone a generated component should be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Enthusiastic,
    Authoritative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Authoritative => "authoritative",
        }
    }

    /// Default tone for an intent when the caller expressed no preference
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Commercial => Tone::Enthusiastic,
            Intent::Educational => Tone::Friendly,
            Intent::Navigational => Tone::Professional,
            Intent::Informational => Tone::Authoritative,
        }
    }
}

/// Reading complexity; doubles as the article difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Beginner => "beginner",
            ComplexityLevel::Intermediate => "intermediate",
            ComplexityLevel::Advanced => "advanced",
        }
    }

    /// Lenient parse used on AI output; unknown values yield None
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "basic" | "easy" | "novice" => Some(ComplexityLevel::Beginner),
            "intermediate" | "medium" | "moderate" => Some(ComplexityLevel::Intermediate),
            "advanced" | "expert" | "hard" => Some(ComplexityLevel::Advanced),
            _ => None,
        }
    }
}

/// Caller-declared content preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPreferences {
    /// Preferred content length: "short", "medium" or "long"
    #[serde(default = "default_length")]
    pub preferred_length: String,
    /// Preferred formats such as "list", "guide", "video"
    #[serde(default)]
    pub preferred_formats: Vec<String>,
    #[serde(default = "default_include_examples")]
    pub include_examples: bool,
}

fn default_length() -> String {
    "medium".to_string()
}

fn default_include_examples() -> bool {
    true
}

impl Default for ContentPreferences {
    fn default() -> Self {
        Self {
            preferred_length: default_length(),
            preferred_formats: Vec::new(),
            include_examples: true,
        }
    }
}

/// Optional caller-side context passed to the page engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub tone_preference: Option<Tone>,
    #[serde(default)]
    pub complexity_level: Option<ComplexityLevel>,
    #[serde(default)]
    pub content_preferences: Option<ContentPreferences>,
    /// Explicit interest signals merged on top of the session vector
    #[serde(default)]
    pub interests: BTreeMap<String, f64>,
}

/// Merged view of user interests and the current query, shared read-only
/// by every component generator for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizationContext {
    pub search_query: String,
    pub user_interests: BTreeMap<String, f64>,
    pub content_preferences: ContentPreferences,
    pub tone_preference: Tone,
    pub complexity_level: ComplexityLevel,
    pub available_content: Vec<DiscoveryResult>,
    pub intent_context: IntentAnalysis,
    pub timestamp: DateTime<Utc>,
}

impl PersonalizationContext {
    /// Creates a context with defaults derived from the intent
    pub fn new(search_query: &str, intent_context: IntentAnalysis) -> Self {
        Self {
            search_query: search_query.trim().to_string(),
            user_interests: BTreeMap::new(),
            content_preferences: ContentPreferences::default(),
            tone_preference: Tone::for_intent(intent_context.primary_intent),
            complexity_level: ComplexityLevel::default(),
            available_content: Vec::new(),
            intent_context,
            timestamp: Utc::now(),
        }
    }

    pub fn with_interests(mut self, interests: BTreeMap<String, f64>) -> Self {
        self.user_interests = interests;
        self
    }

    pub fn with_available_content(mut self, content: Vec<DiscoveryResult>) -> Self {
        self.available_content = content;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone_preference = tone;
        self
    }

    pub fn with_complexity(mut self, level: ComplexityLevel) -> Self {
        self.complexity_level = level;
        self
    }

    pub fn primary_intent(&self) -> Intent {
        self.intent_context.primary_intent
    }

    /// Highest-scoring interests, descending; ties broken by name
    pub fn top_interests(&self, limit: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .user_interests
            .iter()
            .map(|(name, score)| (name.clone(), *score))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PersonalizationContext {
        let analysis = IntentAnalysis::new(Intent::Commercial, 0.8, vec!["buy".to_string()]);
        let mut interests = BTreeMap::new();
        interests.insert("technology".to_string(), 0.9);
        interests.insert("cooking".to_string(), 0.4);
        interests.insert("design".to_string(), 0.9);
        PersonalizationContext::new("  buy a laptop ", analysis).with_interests(interests)
    }

    #[test]
    fn test_query_is_trimmed() {
        assert_eq!(context().search_query, "buy a laptop");
    }

    #[test]
    fn test_top_interests_order_and_ties() {
        let top = context().top_interests(2);
        assert_eq!(top[0].0, "design");
        assert_eq!(top[1].0, "technology");
    }

    #[test]
    fn test_tone_defaults_from_intent() {
        assert_eq!(context().tone_preference, Tone::Enthusiastic);
    }

    #[test]
    fn test_complexity_parse_loose() {
        assert_eq!(ComplexityLevel::parse_loose("Expert"), Some(ComplexityLevel::Advanced));
        assert_eq!(ComplexityLevel::parse_loose(" easy "), Some(ComplexityLevel::Beginner));
        assert_eq!(ComplexityLevel::parse_loose("unknown"), None);
    }

    #[test]
    fn test_discovery_result_deserializes_with_defaults() {
        let json = r#"{"title":"Vanities","url":"https://example.com/v"}"#;
        let result: DiscoveryResult = serde_json::from_str(json).unwrap();
        assert!(result.tags.is_empty());
        assert_eq!(result.relevance_score, 0.0);
    }
}
