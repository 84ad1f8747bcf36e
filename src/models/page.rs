// * Page-level records handed to the rendering/persistence collaborator

use crate::components::ComponentResult;
use crate::models::search::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Page layout template chosen from intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageTemplate {
    Informational,
    Commercial,
    Navigational,
    Educational,
    Basic,
}

impl PageTemplate {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Informational => PageTemplate::Informational,
            Intent::Commercial => PageTemplate::Commercial,
            Intent::Navigational => PageTemplate::Navigational,
            Intent::Educational => PageTemplate::Educational,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageTemplate::Informational => "informational",
            PageTemplate::Commercial => "commercial",
            PageTemplate::Navigational => "navigational",
            PageTemplate::Educational => "educational",
            PageTemplate::Basic => "basic",
        }
    }
}

impl fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of components (header, main, call_to_action)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSection {
    pub components: Vec<ComponentResult>,
}

/// Page-level metadata synthesized from the best components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub intent: Intent,
}

/// Fully assembled page; either a generated page or a complete fallback page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub template: PageTemplate,
    pub sections: BTreeMap<String, PageSection>,
    pub metadata: PageMetadata,
}

impl PageContent {
    /// Iterates every component across all sections
    pub fn components(&self) -> impl Iterator<Item = &ComponentResult> {
        self.sections.values().flat_map(|s| s.components.iter())
    }

    pub fn component_count(&self) -> usize {
        self.sections.values().map(|s| s.components.len()).sum()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
