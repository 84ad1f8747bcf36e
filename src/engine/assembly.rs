// * Page assembly: sections, template and page metadata from component results

use crate::components::ComponentResult;
use crate::models::{
    ComponentType, IntentAnalysis, PageContent, PageMetadata, PageSection, PageTemplate,
};
use std::collections::BTreeMap;
use thiserror::Error;

// * Page keyword cap
const KEYWORD_LIMIT: usize = 12;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("No components to assemble")]
    NoComponents,

    #[error("No component produced a usable title")]
    MissingTitle,
}

/// Section name a component lands in
pub fn section_for(component_type: ComponentType) -> &'static str {
    component_type.section_name()
}

// * Highest confidence first; ties keep fan-out order
fn by_confidence(components: &[ComponentResult]) -> Vec<&ComponentResult> {
    let mut ranked: Vec<&ComponentResult> = components.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Intent keywords first, then component tags, lowercased and deduplicated
pub fn page_keywords(intent: &IntentAnalysis, components: &[ComponentResult]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let candidates = intent
        .keywords
        .iter()
        .chain(components.iter().flat_map(|c| c.content.tags().iter()));
    for keyword in candidates {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || keywords.contains(&keyword) {
            continue;
        }
        keywords.push(keyword);
        if keywords.len() == KEYWORD_LIMIT {
            break;
        }
    }
    keywords
}

/// Builds the page from generated components
///
/// Title and description come from the highest-confidence components that
/// carry them.
pub fn assemble_page(
    intent: &IntentAnalysis,
    components: &[ComponentResult],
) -> Result<PageContent, AssemblyError> {
    if components.is_empty() {
        return Err(AssemblyError::NoComponents);
    }

    let mut sections: BTreeMap<String, PageSection> = BTreeMap::new();
    for component in components {
        sections
            .entry(section_for(component.component_type()).to_string())
            .or_default()
            .components
            .push(component.clone());
    }

    let ranked = by_confidence(components);
    let title = ranked
        .iter()
        .map(|c| c.content.title().trim())
        .find(|t| !t.is_empty())
        .ok_or(AssemblyError::MissingTitle)?
        .to_string();
    let description = ranked
        .iter()
        .map(|c| c.content.description().trim())
        .find(|d| !d.is_empty())
        .unwrap_or_default()
        .to_string();

    Ok(PageContent {
        template: PageTemplate::for_intent(intent.primary_intent),
        sections,
        metadata: PageMetadata {
            title,
            description,
            keywords: page_keywords(intent, components),
            intent: intent.primary_intent,
        },
    })
}
