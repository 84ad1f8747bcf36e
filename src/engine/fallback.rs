// * Basic fallback page built from the query and the raw discovery results

use crate::components::article::rank_sources;
use crate::components::strategy::capitalize_first;
use crate::components::{
    ArticleStrategy, ComponentMetadata, ComponentResult, ComponentStrategy, ContentSchema,
    HeroStrategy,
};
use crate::models::{
    ComponentType, DiscoveryResult, PageContent, PageMetadata, PageSection, PageTemplate,
    PersonalizationContext,
};
use crate::quality::{score_component, DEFAULT_PERSONALIZATION_SCORE};
use crate::refinery::{clean_field, clean_list};
use chrono::Utc;
use std::collections::BTreeMap;

// * Confidence ceiling for any basic-page component
const BASIC_CONFIDENCE_CAP: f64 = 0.5;

const RELATED_SOURCE_LIMIT: usize = 5;
const RELATED_TITLE_MAX: usize = 150;
const DESCRIPTION_MAX: usize = 160;

fn basic_component<C: ContentSchema>(
    component_type: ComponentType,
    content: C,
    context: &PersonalizationContext,
    reason: &str,
) -> ComponentResult {
    let scored = score_component(
        &context.search_query,
        &content.flatten_text(),
        DEFAULT_PERSONALIZATION_SCORE,
        content.completeness(),
    );
    let confidence = scored.overall_confidence.min(BASIC_CONFIDENCE_CAP);

    ComponentResult {
        success: false,
        content: content.into_content(),
        error: Some(reason.to_string()),
        metadata: ComponentMetadata {
            component_type,
            ai_provider: None,
            generation_time: 0.0,
            quality_metrics: Some(scored.with_component_score(component_type.as_str(), confidence)),
            cache_key: String::new(),
            generated_at: Utc::now(),
            error_occurred: true,
        },
        confidence,
        from_cache: false,
    }
}

/// Minimal page: a hero and an article that lists the best discovery results
pub fn basic_page(
    context: &PersonalizationContext,
    discovery_results: &[DiscoveryResult],
    reason: &str,
) -> PageContent {
    let sources = rank_sources(discovery_results);

    let mut hero = HeroStrategy::new().fallback_content(context);
    if let Some(top) = sources.first() {
        hero.cta_url = top.url.clone();
    }

    let mut article = ArticleStrategy::new().fallback_content(context);
    let related: Vec<String> = sources
        .iter()
        .take(RELATED_SOURCE_LIMIT)
        .map(|s| s.title.clone())
        .collect();
    article.related_topics = clean_list(&related, RELATED_SOURCE_LIMIT, RELATED_TITLE_MAX);

    let title = format!("{}: Your Complete Guide", capitalize_first(&context.search_query));
    let description = match sources.first() {
        Some(top) if !top.excerpt.trim().is_empty() => clean_field(&top.excerpt, DESCRIPTION_MAX),
        _ => clean_field(
            &format!("Helpful resources and ideas for {}.", context.search_query),
            DESCRIPTION_MAX,
        ),
    };

    let mut sections = BTreeMap::new();
    sections.insert(
        ComponentType::Hero.section_name().to_string(),
        PageSection {
            components: vec![basic_component(ComponentType::Hero, hero, context, reason)],
        },
    );
    sections.insert(
        ComponentType::Article.section_name().to_string(),
        PageSection {
            components: vec![basic_component(ComponentType::Article, article, context, reason)],
        },
    );

    PageContent {
        template: PageTemplate::Basic,
        sections,
        metadata: PageMetadata {
            title,
            description,
            keywords: context.intent_context.keywords.clone(),
            intent: context.primary_intent(),
        },
    }
}
