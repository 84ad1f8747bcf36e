// * Hero generator: headline block at the top of the page

use crate::components::article::rank_sources;
use crate::components::strategy::{
    capitalize_first, merge_interest_tags, search_url, title_case, ComponentStrategy,
};
use crate::components::types::{ContentSchema, HeroContent};
use crate::models::{ComponentType, DiscoveryResult, Intent, PersonalizationContext};
use crate::quality::{interest_mention_score, significant_words};
use crate::refinery::{
    clean_field, clean_list, extract_json_object, extract_labeled_field, list_field,
    prose_paragraphs, str_field,
};
use serde::{Deserialize, Serialize};

const HEADLINE_MAX: usize = 70;
const SUBHEADLINE_MAX: usize = 160;
const CTA_TEXT_MAX: usize = 30;
const VISUAL_THEME_MAX: usize = 40;
const TAGS_MAX: usize = 6;
const TAG_MAX: usize = 40;

const FOCUS_INTEREST_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineStyle {
    Question,
    Benefit,
    Direct,
    Statement,
}

impl HeadlineStyle {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Educational => HeadlineStyle::Question,
            Intent::Commercial => HeadlineStyle::Benefit,
            Intent::Navigational => HeadlineStyle::Direct,
            Intent::Informational => HeadlineStyle::Statement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadlineStyle::Question => "question",
            HeadlineStyle::Benefit => "benefit",
            HeadlineStyle::Direct => "direct",
            HeadlineStyle::Statement => "statement",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeroContext {
    pub headline_style: HeadlineStyle,
    pub featured_source: Option<DiscoveryResult>,
    pub focus_interests: Vec<String>,
}

fn default_cta_text(intent: Intent) -> &'static str {
    match intent {
        Intent::Commercial => "Shop Now",
        Intent::Educational => "Start Learning",
        Intent::Navigational => "Go There",
        Intent::Informational => "Learn More",
    }
}

fn default_visual_theme(intent: Intent) -> &'static str {
    match intent {
        Intent::Commercial => "bold",
        Intent::Educational => "clean",
        Intent::Navigational => "minimal",
        Intent::Informational => "editorial",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeroStrategy;

impl HeroStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentStrategy for HeroStrategy {
    type Context = HeroContext;
    type Content = HeroContent;

    fn component_type(&self) -> ComponentType {
        ComponentType::Hero
    }

    fn build_context(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> HeroContext {
        HeroContext {
            headline_style: HeadlineStyle::for_intent(context.primary_intent()),
            featured_source: rank_sources(discovery_results).into_iter().next(),
            focus_interests: context
                .top_interests(FOCUS_INTEREST_LIMIT)
                .into_iter()
                .map(|(topic, _)| topic)
                .collect(),
        }
    }

    fn requirements(&self, ctx: &HeroContext) -> String {
        let mut block = format!(
            "Return JSON with:\n\
             - headline: {style}-style, at most {headline} characters\n\
             - subheadline: at most {sub} characters\n\
             - cta_text: button label, at most {cta} characters\n\
             - cta_url: link for the button\n\
             - visual_theme: one or two words\n\
             - tags: up to {tags} lowercase strings",
            style = ctx.headline_style.as_str(),
            headline = HEADLINE_MAX,
            sub = SUBHEADLINE_MAX,
            cta = CTA_TEXT_MAX,
            tags = TAGS_MAX,
        );
        if let Some(source) = &ctx.featured_source {
            block.push_str(&format!("\nFeature this source: {} ({})", source.title, source.url));
        }
        if !ctx.focus_interests.is_empty() {
            block.push_str(&format!("\nSpeak to readers interested in: {}", ctx.focus_interests.join(", ")));
        }
        block
    }

    fn parse_response(
        &self,
        raw: &str,
        context: &PersonalizationContext,
        ctx: &HeroContext,
    ) -> HeroContent {
        let parsed = match extract_json_object(raw) {
            Some(map) => HeroContent {
                headline: str_field(&map, &["headline", "title"]).unwrap_or_default(),
                subheadline: str_field(&map, &["subheadline", "subtitle", "description"])
                    .unwrap_or_default(),
                cta_text: str_field(&map, &["cta_text", "button_text", "cta"]).unwrap_or_default(),
                cta_url: str_field(&map, &["cta_url", "url", "link"]).unwrap_or_default(),
                visual_theme: str_field(&map, &["visual_theme", "theme"]).unwrap_or_default(),
                tags: list_field(&map, "tags"),
                ..Default::default()
            },
            None => {
                let paragraphs = prose_paragraphs(raw);
                let mut rest = paragraphs.iter();
                HeroContent {
                    headline: extract_labeled_field(raw, &["headline", "title"])
                        .or_else(|| rest.next().cloned())
                        .unwrap_or_default(),
                    subheadline: extract_labeled_field(raw, &["subheadline", "subtitle"])
                        .or_else(|| rest.next().cloned())
                        .unwrap_or_default(),
                    cta_text: extract_labeled_field(raw, &["cta_text", "cta", "button"])
                        .unwrap_or_default(),
                    ..Default::default()
                }
            }
        };

        let intent = context.primary_intent();
        let cta_text = if parsed.cta_text.trim().is_empty() {
            default_cta_text(intent).to_string()
        } else {
            parsed.cta_text
        };
        let cta_url = if parsed.cta_url.trim().is_empty() {
            ctx.featured_source
                .as_ref()
                .map(|s| s.url.clone())
                .unwrap_or_else(|| search_url(&context.search_query))
        } else {
            parsed.cta_url.trim().to_string()
        };
        let visual_theme = if parsed.visual_theme.trim().is_empty() {
            default_visual_theme(intent).to_string()
        } else {
            parsed.visual_theme
        };

        HeroContent {
            headline: clean_field(&parsed.headline, HEADLINE_MAX),
            subheadline: clean_field(&parsed.subheadline, SUBHEADLINE_MAX),
            cta_text: clean_field(&cta_text, CTA_TEXT_MAX),
            cta_url,
            tone: context.tone_preference,
            visual_theme: clean_field(&visual_theme, VISUAL_THEME_MAX),
            tags: clean_list(&parsed.tags, TAGS_MAX, TAG_MAX),
        }
    }

    fn personalize(&self, content: &mut HeroContent, context: &PersonalizationContext) {
        content.tone = context.tone_preference;
        merge_interest_tags(&mut content.tags, context, FOCUS_INTEREST_LIMIT, TAGS_MAX);
    }

    fn personalization_score(&self, content: &HeroContent, context: &PersonalizationContext) -> f64 {
        interest_mention_score(&context.user_interests, &content.flatten_text())
    }

    fn fallback_content(&self, context: &PersonalizationContext) -> HeroContent {
        let query = context.search_query.trim();
        let intent = context.primary_intent();
        let headline = match HeadlineStyle::for_intent(intent) {
            HeadlineStyle::Question => format!("Want to Learn {}?", title_case(query)),
            HeadlineStyle::Benefit => format!("Find the Best {}", title_case(query)),
            HeadlineStyle::Direct => title_case(query),
            HeadlineStyle::Statement => format!("{}: What You Need to Know", capitalize_first(query)),
        };

        HeroContent {
            headline: clean_field(&headline, HEADLINE_MAX),
            subheadline: clean_field(
                &format!("Practical ideas, trusted resources and clear next steps for {}.", query),
                SUBHEADLINE_MAX,
            ),
            cta_text: default_cta_text(intent).to_string(),
            cta_url: search_url(query),
            tone: context.tone_preference,
            visual_theme: default_visual_theme(intent).to_string(),
            tags: significant_words(query).into_iter().take(TAGS_MAX).collect(),
        }
    }
}
