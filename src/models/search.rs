// * Search-side records: classified intent and the per-request SearchContext

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified purpose of a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Informational,
    Commercial,
    Navigational,
    Educational,
}

impl Intent {
    /// All intents in classification tie-break order
    pub const ALL: [Intent; 4] = [
        Intent::Commercial,
        Intent::Educational,
        Intent::Navigational,
        Intent::Informational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Informational => "informational",
            Intent::Commercial => "commercial",
            Intent::Navigational => "navigational",
            Intent::Educational => "educational",
        }
    }

    /// Ordered component types a page for this intent is built from
    pub fn suggested_components(&self) -> Vec<ComponentType> {
        match self {
            Intent::Commercial => vec![ComponentType::Hero, ComponentType::Cta, ComponentType::Article],
            Intent::Educational => vec![ComponentType::Hero, ComponentType::Article, ComponentType::Cta],
            Intent::Navigational => vec![ComponentType::Hero, ComponentType::Cta],
            Intent::Informational => vec![ComponentType::Hero, ComponentType::Article],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "informational" => Ok(Intent::Informational),
            "commercial" => Ok(Intent::Commercial),
            "navigational" => Ok(Intent::Navigational),
            "educational" => Ok(Intent::Educational),
            other => Err(format!("unknown intent: {}", other)),
        }
    }
}

/// Content block kinds a page is composed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Hero,
    Article,
    Cta,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [ComponentType::Hero, ComponentType::Article, ComponentType::Cta];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Hero => "hero",
            ComponentType::Article => "article",
            ComponentType::Cta => "cta",
        }
    }

    /// Page section this component is placed into
    pub fn section_name(&self) -> &'static str {
        match self {
            ComponentType::Hero => "header",
            ComponentType::Article => "main",
            ComponentType::Cta => "call_to_action",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hero" => Ok(ComponentType::Hero),
            "article" => Ok(ComponentType::Article),
            "cta" | "call_to_action" => Ok(ComponentType::Cta),
            other => Err(format!("unknown component type: {}", other)),
        }
    }
}

/// Result of intent analysis for a single query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub primary_intent: Intent,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub suggested_components: Vec<ComponentType>,
}

impl IntentAnalysis {
    /// Builds an analysis for a known intent with its default component list
    pub fn new(primary_intent: Intent, confidence: f64, keywords: Vec<String>) -> Self {
        Self {
            primary_intent,
            confidence: confidence.clamp(0.0, 1.0),
            keywords,
            suggested_components: primary_intent.suggested_components(),
        }
    }
}

/// Per-request search context; created once by the engine, never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchContext {
    pub query: String,
    pub intent: IntentAnalysis,
    pub timestamp: DateTime<Utc>,
}

impl SearchContext {
    pub fn new(query: &str, intent: IntentAnalysis) -> Self {
        Self {
            query: query.trim().to_string(),
            intent,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_roundtrip_names() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
        assert!("shopping".parse::<Intent>().is_err());
    }

    #[test]
    fn test_suggested_components_always_start_with_hero() {
        for intent in Intent::ALL {
            assert_eq!(intent.suggested_components()[0], ComponentType::Hero);
        }
        assert!(Intent::Commercial
            .suggested_components()
            .contains(&ComponentType::Cta));
    }

    #[test]
    fn test_intent_serializes_lowercase() {
        let json = serde_json::to_string(&Intent::Commercial).unwrap();
        assert_eq!(json, "\"commercial\"");
    }

    #[test]
    fn test_analysis_clamps_confidence() {
        let analysis = IntentAnalysis::new(Intent::Educational, 1.7, vec![]);
        assert_eq!(analysis.confidence, 1.0);
        assert_eq!(analysis.suggested_components, Intent::Educational.suggested_components());
    }

    #[test]
    fn test_component_sections() {
        assert_eq!(ComponentType::Hero.section_name(), "header");
        assert_eq!(ComponentType::Article.section_name(), "main");
        assert_eq!("call_to_action".parse::<ComponentType>().unwrap(), ComponentType::Cta);
    }
}
