// * Per-type hooks plugged into the fixed generation pipeline

use crate::components::types::ContentSchema;
use crate::models::{ComponentType, DiscoveryResult, PersonalizationContext};
use crate::quality::DEFAULT_PERSONALIZATION_SCORE;

// * Discovery results quoted in a prompt
const PROMPT_SOURCE_LIMIT: usize = 5;

// * Interests quoted in a prompt
const PROMPT_INTEREST_LIMIT: usize = 5;

// * Excerpt budget per quoted source
const PROMPT_EXCERPT_CHARS: usize = 200;

/// Type-specific behavior of one component generator
///
/// `ComponentGenerator` owns the order of the steps; implementors only
/// fill in what differs between hero, article and CTA content.
pub trait ComponentStrategy: Send + Sync + 'static {
    /// Derived view of the request used while building this component
    type Context: Send + Sync;
    type Content: ContentSchema;

    fn component_type(&self) -> ComponentType;

    fn build_context(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> Self::Context;

    /// Type-specific requirements block appended to the base prompt
    fn requirements(&self, generation_context: &Self::Context) -> String;

    fn system_message(&self) -> &'static str {
        "You write concise, accurate web page content. Respond with a single JSON object and nothing else."
    }

    fn build_prompt(
        &self,
        context: &PersonalizationContext,
        generation_context: &Self::Context,
        discovery_results: &[DiscoveryResult],
    ) -> String {
        base_prompt(
            context,
            discovery_results,
            self.component_type(),
            &self.requirements(generation_context),
        )
    }

    /// Strict JSON first, then a permissive parse; never fails
    fn parse_response(
        &self,
        raw: &str,
        context: &PersonalizationContext,
        generation_context: &Self::Context,
    ) -> Self::Content;

    fn personalize(&self, content: &mut Self::Content, context: &PersonalizationContext);

    fn personalization_score(
        &self,
        _content: &Self::Content,
        _context: &PersonalizationContext,
    ) -> f64 {
        DEFAULT_PERSONALIZATION_SCORE
    }

    /// Deterministic content built only from the query and intent
    fn fallback_content(&self, context: &PersonalizationContext) -> Self::Content;
}

/// Generic prompt: query, intent, reader profile, sources, then requirements
pub fn base_prompt(
    context: &PersonalizationContext,
    discovery_results: &[DiscoveryResult],
    component_type: ComponentType,
    requirements: &str,
) -> String {
    let interests = context.top_interests(PROMPT_INTEREST_LIMIT);
    let interest_line = if interests.is_empty() {
        "none recorded".to_string()
    } else {
        interests
            .iter()
            .map(|(topic, score)| format!("{} ({:.2})", topic, score))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut prompt = format!(
        "Write the {component} section of a web page.\n\n\
         Search query: {query}\n\
         Intent: {intent} (confidence {confidence:.2})\n\
         Tone: {tone}\n\
         Reader level: {level}\n\
         Reader interests: {interests}\n",
        component = component_type.as_str(),
        query = context.search_query,
        intent = context.primary_intent().as_str(),
        confidence = context.intent_context.confidence,
        tone = context.tone_preference.as_str(),
        level = context.complexity_level.as_str(),
        interests = interest_line,
    );

    if !discovery_results.is_empty() {
        prompt.push_str("\nRelevant sources:\n");
        for result in discovery_results.iter().take(PROMPT_SOURCE_LIMIT) {
            let excerpt: String = result.excerpt.chars().take(PROMPT_EXCERPT_CHARS).collect();
            prompt.push_str(&format!("- {} ({})", result.title, result.url));
            if !excerpt.trim().is_empty() {
                prompt.push_str(&format!(": {}", excerpt.trim()));
            }
            prompt.push('\n');
        }
    }

    prompt.push_str("\nRequirements:\n");
    prompt.push_str(requirements.trim());
    prompt.push_str("\n\nRespond with a single JSON object only.");
    prompt
}

/// Puts the top interests first in `tags`, deduplicated case-insensitively
pub fn merge_interest_tags(
    tags: &mut Vec<String>,
    context: &PersonalizationContext,
    interest_limit: usize,
    max_tags: usize,
) {
    let mut merged: Vec<String> = Vec::with_capacity(max_tags);
    let interest_tags = context
        .top_interests(interest_limit)
        .into_iter()
        .map(|(topic, _)| topic.replace('_', " "));

    for tag in interest_tags.chain(tags.drain(..)) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || merged.iter().any(|t| *t == tag) {
            continue;
        }
        merged.push(tag);
    }
    merged.truncate(max_tags);
    *tags = merged;
}

/// Query with its first letter capitalized, the rest untouched
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title-cases each word (`"tile flooring"` -> `"Tile Flooring"`)
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search URL for the query (site-relative)
pub fn search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("/search?q={}", encoded)
}
