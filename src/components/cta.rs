// * Call-to-action generator

use crate::components::strategy::{merge_interest_tags, search_url, ComponentStrategy};
use crate::components::types::{ActionType, CtaContent, Urgency};
use crate::models::{ComponentType, DiscoveryResult, Intent, PersonalizationContext};
use crate::refinery::{
    clean_field, clean_list, extract_bullets, extract_json_object, extract_labeled_field,
    list_field, prose_paragraphs, str_field,
};

const HEADLINE_MAX: usize = 60;
const DESCRIPTION_MAX: usize = 200;
const BUTTON_TEXT_MAX: usize = 25;
const SUPPORTING_POINTS_MAX: usize = 3;
const POINT_MAX: usize = 80;
const TAGS_MAX: usize = 5;
const TAG_MAX: usize = 40;

const OFFER_HINT_LIMIT: usize = 3;
const TAG_INTEREST_LIMIT: usize = 2;

#[derive(Debug, Clone)]
pub struct CtaContext {
    pub action_type: ActionType,
    pub urgency: Urgency,
    /// Distinct discovery categories, first seen first
    pub offer_hints: Vec<String>,
    pub target_url: String,
}

pub fn action_for_intent(intent: Intent) -> ActionType {
    match intent {
        Intent::Commercial => ActionType::Purchase,
        Intent::Educational => ActionType::LearnMore,
        Intent::Navigational => ActionType::Explore,
        Intent::Informational => ActionType::Subscribe,
    }
}

pub fn urgency_for_intent(intent: Intent) -> Urgency {
    match intent {
        Intent::Commercial => Urgency::High,
        Intent::Navigational => Urgency::Low,
        Intent::Educational | Intent::Informational => Urgency::Medium,
    }
}

pub fn offer_hints(results: &[DiscoveryResult]) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    for result in results {
        let category = result.category.trim().to_lowercase();
        if category.is_empty() || hints.contains(&category) {
            continue;
        }
        hints.push(category);
        if hints.len() == OFFER_HINT_LIMIT {
            break;
        }
    }
    hints
}

fn default_button_text(action: ActionType) -> &'static str {
    match action {
        ActionType::Purchase => "Shop Now",
        ActionType::LearnMore => "Start Learning",
        ActionType::Explore => "Explore",
        ActionType::Subscribe => "Subscribe",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CtaStrategy;

impl CtaStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentStrategy for CtaStrategy {
    type Context = CtaContext;
    type Content = CtaContent;

    fn component_type(&self) -> ComponentType {
        ComponentType::Cta
    }

    fn build_context(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> CtaContext {
        let intent = context.primary_intent();
        let target_url = discovery_results
            .iter()
            .max_by(|a, b| {
                a.relevance_score
                    .partial_cmp(&b.relevance_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .filter(|_| intent == Intent::Commercial || intent == Intent::Navigational)
            .map(|r| r.url.clone())
            .unwrap_or_else(|| search_url(&context.search_query));

        CtaContext {
            action_type: action_for_intent(intent),
            urgency: urgency_for_intent(intent),
            offer_hints: offer_hints(discovery_results),
            target_url,
        }
    }

    fn requirements(&self, ctx: &CtaContext) -> String {
        let mut block = format!(
            "Write a call to action with action type {action} and {urgency} urgency. Return JSON with:\n\
             - headline: at most {headline} characters\n\
             - description: at most {description} characters\n\
             - button_text: at most {button} characters\n\
             - supporting_points: up to {points} short strings\n\
             - tags: up to {tags} lowercase strings",
            action = ctx.action_type.as_str(),
            urgency = ctx.urgency.as_str(),
            headline = HEADLINE_MAX,
            description = DESCRIPTION_MAX,
            button = BUTTON_TEXT_MAX,
            points = SUPPORTING_POINTS_MAX,
            tags = TAGS_MAX,
        );
        if !ctx.offer_hints.is_empty() {
            block.push_str(&format!("\nRelevant offers: {}", ctx.offer_hints.join(", ")));
        }
        block
    }

    fn system_message(&self) -> &'static str {
        "You write short, honest calls to action for web pages. Never invent prices or discounts. \
         Respond with a single JSON object and nothing else."
    }

    fn parse_response(
        &self,
        raw: &str,
        _context: &PersonalizationContext,
        ctx: &CtaContext,
    ) -> CtaContent {
        let parsed = match extract_json_object(raw) {
            Some(map) => CtaContent {
                headline: str_field(&map, &["headline", "title"]).unwrap_or_default(),
                description: str_field(&map, &["description", "body", "text"]).unwrap_or_default(),
                button_text: str_field(&map, &["button_text", "cta_text", "button"])
                    .unwrap_or_default(),
                button_url: str_field(&map, &["button_url", "url", "link"]).unwrap_or_default(),
                urgency: str_field(&map, &["urgency"])
                    .and_then(|u| Urgency::parse_loose(&u))
                    .unwrap_or(ctx.urgency),
                action_type: str_field(&map, &["action_type", "action"])
                    .and_then(|a| ActionType::parse_loose(&a))
                    .unwrap_or(ctx.action_type),
                supporting_points: list_field(&map, "supporting_points"),
                tags: list_field(&map, "tags"),
            },
            None => {
                let paragraphs = prose_paragraphs(raw);
                let mut rest = paragraphs.iter();
                CtaContent {
                    headline: extract_labeled_field(raw, &["headline", "title"])
                        .or_else(|| rest.next().cloned())
                        .unwrap_or_default(),
                    description: extract_labeled_field(raw, &["description"])
                        .or_else(|| rest.next().cloned())
                        .unwrap_or_default(),
                    button_text: extract_labeled_field(raw, &["button_text", "button", "cta"])
                        .unwrap_or_default(),
                    urgency: ctx.urgency,
                    action_type: ctx.action_type,
                    supporting_points: extract_bullets(raw),
                    ..Default::default()
                }
            }
        };

        let button_text = if parsed.button_text.trim().is_empty() {
            default_button_text(parsed.action_type).to_string()
        } else {
            parsed.button_text
        };
        let button_url = if parsed.button_url.trim().is_empty() {
            ctx.target_url.clone()
        } else {
            parsed.button_url.trim().to_string()
        };

        CtaContent {
            headline: clean_field(&parsed.headline, HEADLINE_MAX),
            description: clean_field(&parsed.description, DESCRIPTION_MAX),
            button_text: clean_field(&button_text, BUTTON_TEXT_MAX),
            button_url,
            urgency: parsed.urgency,
            action_type: parsed.action_type,
            supporting_points: clean_list(&parsed.supporting_points, SUPPORTING_POINTS_MAX, POINT_MAX),
            tags: clean_list(&parsed.tags, TAGS_MAX, TAG_MAX),
        }
    }

    fn personalize(&self, content: &mut CtaContent, context: &PersonalizationContext) {
        merge_interest_tags(&mut content.tags, context, TAG_INTEREST_LIMIT, TAGS_MAX);
    }

    fn fallback_content(&self, context: &PersonalizationContext) -> CtaContent {
        let query = context.search_query.trim();
        let intent = context.primary_intent();
        let action_type = action_for_intent(intent);
        let (headline, description, points): (String, String, [&str; 3]) = match action_type {
            ActionType::Purchase => (
                format!("Ready to shop for {}?", query),
                format!("Compare top-rated options for {} and pick the one that fits your budget.", query),
                ["Compare trusted sellers", "Check reviews first", "Find the right fit"],
            ),
            ActionType::LearnMore => (
                format!("Keep learning about {}", query),
                format!("Follow step-by-step guides and build real confidence with {}.", query),
                ["Step-by-step guides", "Beginner friendly", "Practical examples"],
            ),
            ActionType::Explore => (
                format!("Explore {}", query),
                format!("Jump straight to the most useful resources for {}.", query),
                ["Curated resources", "Direct links", "Up to date"],
            ),
            ActionType::Subscribe => (
                format!("Stay updated on {}", query),
                format!("Get fresh ideas and news about {} delivered to your inbox.", query),
                ["Fresh ideas weekly", "No spam", "Unsubscribe anytime"],
            ),
        };

        CtaContent {
            headline: clean_field(&headline, HEADLINE_MAX),
            description: clean_field(&description, DESCRIPTION_MAX),
            button_text: default_button_text(action_type).to_string(),
            button_url: search_url(query),
            urgency: urgency_for_intent(intent),
            action_type,
            supporting_points: points.iter().map(|p| p.to_string()).collect(),
            tags: Vec::new(),
        }
    }
}
