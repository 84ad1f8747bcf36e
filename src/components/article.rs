// * Article generator: ranked sources, structure selection, long-form schema

use crate::components::strategy::{
    base_prompt, capitalize_first, merge_interest_tags, ComponentStrategy,
};
use crate::components::types::{ArticleContent, ArticleFormat, ContentSchema, Difficulty};
use crate::models::{ComponentType, DiscoveryResult, Intent, PersonalizationContext};
use crate::quality::{interest_mention_score, significant_words};
use crate::refinery::{
    clean_field, clean_list, extract_bullets, extract_json_object, extract_labeled_field,
    list_field, prose_paragraphs, str_field, u32_field,
};
use serde::{Deserialize, Serialize};

// * Field budgets (graphemes) and list caps
const TITLE_MAX: usize = 80;
const SUMMARY_MAX: usize = 150;
const INTRODUCTION_MAX: usize = 300;
const MAIN_CONTENT_MAX: usize = 800;
const KEY_POINTS_MAX: usize = 5;
const RELATED_TOPICS_MAX: usize = 5;
const TAGS_MAX: usize = 8;
const LIST_ITEM_MAX: usize = 150;
const TAG_MAX: usize = 40;

// * Sources kept after ranking
const SOURCE_LIMIT: usize = 10;

// * More sources than this selects the comprehensive structure
const COMPREHENSIVE_SOURCE_THRESHOLD: usize = 5;

// * Interest score above which tech-adjacent readers get advanced content
const TECH_INTEREST_THRESHOLD: f64 = 0.6;

const TECH_ADJACENT_INTERESTS: &[&str] = &[
    "technology",
    "tech",
    "programming",
    "software",
    "engineering",
    "science",
    "data",
    "ai",
    "electronics",
    "computers",
];

// * Reading speed for reading_time estimates
const WORDS_PER_MINUTE: usize = 200;

// * Interests injected into tags
const TAG_INTEREST_LIMIT: usize = 3;

const KEY_TOPIC_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStructure {
    Tutorial,
    Comparison,
    Comprehensive,
    Summary,
}

impl ArticleStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStructure::Tutorial => "tutorial",
            ArticleStructure::Comparison => "comparison",
            ArticleStructure::Comprehensive => "comprehensive",
            ArticleStructure::Summary => "summary",
        }
    }

    fn default_format(&self) -> ArticleFormat {
        match self {
            ArticleStructure::Tutorial => ArticleFormat::Tutorial,
            ArticleStructure::Comparison => ArticleFormat::Analysis,
            ArticleStructure::Comprehensive => ArticleFormat::Guide,
            ArticleStructure::Summary => ArticleFormat::Overview,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleContext {
    pub key_topics: Vec<String>,
    pub structure: ArticleStructure,
    pub reading_level: Difficulty,
    /// Words
    pub target_length: usize,
    pub sources: Vec<DiscoveryResult>,
}

/// Discovery results by relevance, highest first, capped at ten
pub fn rank_sources(results: &[DiscoveryResult]) -> Vec<DiscoveryResult> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(SOURCE_LIMIT);
    ranked
}

pub fn select_structure(intent: Intent, source_count: usize) -> ArticleStructure {
    match intent {
        Intent::Educational => ArticleStructure::Tutorial,
        Intent::Commercial => ArticleStructure::Comparison,
        _ if source_count > COMPREHENSIVE_SOURCE_THRESHOLD => ArticleStructure::Comprehensive,
        _ => ArticleStructure::Summary,
    }
}

/// Advanced for strong tech-adjacent interests, otherwise the declared complexity
pub fn reading_level(context: &PersonalizationContext) -> Difficulty {
    let tech_heavy = context.user_interests.iter().any(|(topic, score)| {
        *score > TECH_INTEREST_THRESHOLD
            && TECH_ADJACENT_INTERESTS.contains(&topic.to_lowercase().as_str())
    });
    if tech_heavy {
        Difficulty::Advanced
    } else {
        Difficulty::from(context.complexity_level)
    }
}

pub fn target_length(intent: Intent) -> usize {
    match intent {
        Intent::Educational => 1200,
        Intent::Informational => 1000,
        Intent::Commercial => 800,
        Intent::Navigational => 500,
    }
}

fn estimate_reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    (words.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleStrategy;

impl ArticleStrategy {
    pub fn new() -> Self {
        Self
    }

    fn from_json(
        &self,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> ArticleContent {
        ArticleContent {
            title: str_field(map, &["title", "headline"]).unwrap_or_default(),
            summary: str_field(map, &["summary", "description"]).unwrap_or_default(),
            introduction: str_field(map, &["introduction", "intro"]).unwrap_or_default(),
            main_content: str_field(map, &["main_content", "content", "body"]).unwrap_or_default(),
            key_points: list_field(map, "key_points"),
            related_topics: list_field(map, "related_topics"),
            reading_time: u32_field(map, "reading_time").unwrap_or(0),
            difficulty_level: str_field(map, &["difficulty_level", "difficulty"])
                .and_then(|d| Difficulty::parse_loose(&d))
                .unwrap_or_default(),
            content_type: str_field(map, &["content_type", "type"])
                .and_then(|t| ArticleFormat::parse_loose(&t))
                .unwrap_or_default(),
            tags: list_field(map, "tags"),
        }
    }

    // * Permissive parse: labeled lines first, then paragraph positions
    fn from_text(&self, raw: &str) -> ArticleContent {
        let paragraphs = prose_paragraphs(raw);
        let mut rest = paragraphs.iter();

        let title = extract_labeled_field(raw, &["title", "headline"])
            .or_else(|| rest.next().cloned())
            .unwrap_or_default();
        let summary = extract_labeled_field(raw, &["summary"])
            .or_else(|| rest.next().cloned())
            .unwrap_or_default();
        let introduction = extract_labeled_field(raw, &["introduction", "intro"])
            .or_else(|| rest.next().cloned())
            .unwrap_or_default();
        let remaining: Vec<String> = rest.cloned().collect();
        let main_content = if remaining.is_empty() {
            introduction.clone()
        } else {
            remaining.join("\n\n")
        };

        ArticleContent {
            title,
            summary,
            introduction,
            main_content,
            key_points: extract_bullets(raw),
            ..Default::default()
        }
    }
}

impl ComponentStrategy for ArticleStrategy {
    type Context = ArticleContext;
    type Content = ArticleContent;

    fn component_type(&self) -> ComponentType {
        ComponentType::Article
    }

    fn build_context(
        &self,
        context: &PersonalizationContext,
        discovery_results: &[DiscoveryResult],
    ) -> ArticleContext {
        let sources = rank_sources(discovery_results);
        let mut key_topics: Vec<String> = Vec::new();
        for topic in context
            .intent_context
            .keywords
            .iter()
            .cloned()
            .chain(significant_words(&context.search_query))
        {
            let topic = topic.to_lowercase();
            if !key_topics.contains(&topic) {
                key_topics.push(topic);
            }
        }
        key_topics.truncate(KEY_TOPIC_LIMIT);

        ArticleContext {
            key_topics,
            structure: select_structure(context.primary_intent(), sources.len()),
            reading_level: reading_level(context),
            target_length: target_length(context.primary_intent()),
            sources,
        }
    }

    fn requirements(&self, ctx: &ArticleContext) -> String {
        format!(
            "Write a {structure} article for a {level} reader, about {length} words of source material condensed into:\n\
             - title: at most {title} characters\n\
             - summary: at most {summary} characters\n\
             - introduction: at most {intro} characters\n\
             - main_content: at most {main} characters, plain text paragraphs\n\
             - key_points: up to {points} short strings\n\
             - related_topics: up to {related} strings\n\
             - reading_time: minutes as an integer\n\
             - difficulty_level: beginner, intermediate or advanced\n\
             - content_type: guide, tutorial, overview or analysis\n\
             - tags: up to {tags} lowercase strings\n\
             Key topics: {topics}",
            structure = ctx.structure.as_str(),
            level = ctx.reading_level.as_str(),
            length = ctx.target_length,
            title = TITLE_MAX,
            summary = SUMMARY_MAX,
            intro = INTRODUCTION_MAX,
            main = MAIN_CONTENT_MAX,
            points = KEY_POINTS_MAX,
            related = RELATED_TOPICS_MAX,
            tags = TAGS_MAX,
            topics = if ctx.key_topics.is_empty() {
                "none".to_string()
            } else {
                ctx.key_topics.join(", ")
            },
        )
    }

    // * Quotes the ranked sources rather than the raw discovery order
    fn build_prompt(
        &self,
        context: &PersonalizationContext,
        ctx: &ArticleContext,
        _discovery_results: &[DiscoveryResult],
    ) -> String {
        base_prompt(context, &ctx.sources, self.component_type(), &self.requirements(ctx))
    }

    fn parse_response(
        &self,
        raw: &str,
        _context: &PersonalizationContext,
        ctx: &ArticleContext,
    ) -> ArticleContent {
        let (parsed, strict) = match extract_json_object(raw) {
            Some(map) => (self.from_json(&map), true),
            None => (self.from_text(raw), false),
        };

        let main_content = clean_field(&parsed.main_content, MAIN_CONTENT_MAX);
        let reading_time = if parsed.reading_time > 0 {
            parsed.reading_time
        } else {
            estimate_reading_time(&parsed.main_content)
        };

        ArticleContent {
            title: clean_field(&parsed.title, TITLE_MAX),
            summary: clean_field(&parsed.summary, SUMMARY_MAX),
            introduction: clean_field(&parsed.introduction, INTRODUCTION_MAX),
            main_content,
            key_points: clean_list(&parsed.key_points, KEY_POINTS_MAX, LIST_ITEM_MAX),
            related_topics: clean_list(&parsed.related_topics, RELATED_TOPICS_MAX, LIST_ITEM_MAX),
            reading_time,
            difficulty_level: if strict {
                parsed.difficulty_level
            } else {
                ctx.reading_level
            },
            content_type: if strict {
                parsed.content_type
            } else {
                ctx.structure.default_format()
            },
            tags: clean_list(&parsed.tags, TAGS_MAX, TAG_MAX),
        }
    }

    fn personalize(&self, content: &mut ArticleContent, context: &PersonalizationContext) {
        merge_interest_tags(&mut content.tags, context, TAG_INTEREST_LIMIT, TAGS_MAX);
        content.difficulty_level = reading_level(context);
    }

    fn personalization_score(&self, content: &ArticleContent, context: &PersonalizationContext) -> f64 {
        interest_mention_score(&context.user_interests, &content.flatten_text())
    }

    fn fallback_content(&self, context: &PersonalizationContext) -> ArticleContent {
        let query = context.search_query.trim();
        let subject = capitalize_first(query);
        let title = match context.primary_intent() {
            Intent::Educational => format!("{}: A Step-by-Step Guide", subject),
            Intent::Commercial => format!("{}: What to Compare Before You Buy", subject),
            Intent::Navigational => format!("{}: Where to Start", subject),
            Intent::Informational => format!("{}: Your Complete Guide", subject),
        };
        let content_type = match context.primary_intent() {
            Intent::Educational => ArticleFormat::Tutorial,
            Intent::Commercial => ArticleFormat::Analysis,
            Intent::Navigational => ArticleFormat::Overview,
            Intent::Informational => ArticleFormat::Guide,
        };

        ArticleContent {
            title: clean_field(&title, TITLE_MAX),
            summary: clean_field(
                &format!("An overview of {} and the essentials to know before you start.", query),
                SUMMARY_MAX,
            ),
            introduction: clean_field(
                &format!(
                    "Whether you are just getting started or refining a plan, this page brings together the key facts about {}.",
                    query
                ),
                INTRODUCTION_MAX,
            ),
            main_content: clean_field(
                &format!(
                    "Start with {q} by setting clear goals and a realistic budget. Compare the available options side by side, \
                     check reviews from people who have done it before and plan each step before committing.",
                    q = query
                ),
                MAIN_CONTENT_MAX,
            ),
            key_points: vec![
                "Define your goals first".to_string(),
                "Compare options before committing".to_string(),
                "Plan each step in advance".to_string(),
            ],
            related_topics: Vec::new(),
            reading_time: 2,
            difficulty_level: Difficulty::from(context.complexity_level),
            content_type,
            tags: significant_words(query).into_iter().take(TAGS_MAX).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplexityLevel, IntentAnalysis};
    use std::collections::BTreeMap;

    fn context(query: &str, intent: Intent) -> PersonalizationContext {
        PersonalizationContext::new(query, IntentAnalysis::new(intent, 0.8, vec![]))
    }

    fn sources(n: usize) -> Vec<DiscoveryResult> {
        (0..n)
            .map(|i| DiscoveryResult::new(&format!("S{}", i), &format!("https://x.y/{}", i), i as f64 / 20.0))
            .collect()
    }

    #[test]
    fn test_rank_sources_desc_top_ten() {
        let ranked = rank_sources(&sources(12));
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].title, "S11");
        assert!(ranked.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[test]
    fn test_prompt_quotes_ranked_sources() {
        let strategy = ArticleStrategy::new();
        let ctx = context("tile flooring", Intent::Informational);
        let mut discovery: Vec<DiscoveryResult> = (0..6)
            .map(|i| DiscoveryResult::new(&format!("Weak{}", i), &format!("https://weak.example/{}", i), 0.1))
            .collect();
        discovery.push(DiscoveryResult::new("Best Source", "https://best.example/", 0.99));

        let gctx = strategy.build_context(&ctx, &discovery);
        let prompt = strategy.build_prompt(&ctx, &gctx, &discovery);
        assert!(prompt.contains("Best Source"));
        assert!(prompt.find("Best Source") < prompt.find("Weak0"));
    }

    #[test]
    fn test_structure_selection() {
        assert_eq!(select_structure(Intent::Educational, 9), ArticleStructure::Tutorial);
        assert_eq!(select_structure(Intent::Commercial, 0), ArticleStructure::Comparison);
        assert_eq!(select_structure(Intent::Informational, 6), ArticleStructure::Comprehensive);
        assert_eq!(select_structure(Intent::Navigational, 5), ArticleStructure::Summary);
    }

    #[test]
    fn test_reading_level_from_tech_interest() {
        let mut interests = BTreeMap::new();
        interests.insert("technology".to_string(), 0.7);
        let ctx = context("rust async", Intent::Educational).with_interests(interests);
        assert_eq!(reading_level(&ctx), Difficulty::Advanced);

        let ctx = context("rust async", Intent::Educational).with_complexity(ComplexityLevel::Beginner);
        assert_eq!(reading_level(&ctx), Difficulty::Beginner);
    }

    #[test]
    fn test_parse_json_truncates_main_content() {
        let strategy = ArticleStrategy::new();
        let ctx = context("tile flooring", Intent::Informational);
        let gctx = strategy.build_context(&ctx, &[]);
        let raw = serde_json::json!({
            "title": "Tile Flooring",
            "summary": "Short summary",
            "introduction": "Intro",
            "main_content": "x".repeat(2000),
            "key_points": ["a", "b", "c", "d", "e", "f"],
            "difficulty_level": "beginner",
            "content_type": "overview"
        })
        .to_string();

        let content = strategy.parse_response(&raw, &ctx, &gctx);
        assert_eq!(content.main_content.chars().count(), 800);
        assert!(content.main_content.ends_with("..."));
        assert_eq!(content.key_points.len(), 5);
        assert_eq!(content.difficulty_level, Difficulty::Beginner);
        assert_eq!(content.content_type, ArticleFormat::Overview);
        assert_eq!(content.reading_time, 1);
    }

    #[test]
    fn test_parse_plain_text_fallback() {
        let strategy = ArticleStrategy::new();
        let ctx = context("tile flooring", Intent::Educational);
        let gctx = strategy.build_context(&ctx, &[]);
        let raw = "Tile Flooring Basics\n\nA quick summary.\n\nAn introduction.\n\nBody one.\n\nBody two.\n\n- point one\n- point two";

        let content = strategy.parse_response(raw, &ctx, &gctx);
        assert_eq!(content.title, "Tile Flooring Basics");
        assert_eq!(content.summary, "A quick summary.");
        assert_eq!(content.main_content, "Body one.\n\nBody two.");
        assert_eq!(content.key_points, vec!["point one", "point two"]);
        assert_eq!(content.content_type, ArticleFormat::Tutorial);
    }

    #[test]
    fn test_fallback_has_required_fields() {
        let strategy = ArticleStrategy::new();
        for intent in Intent::ALL {
            let content = strategy.fallback_content(&context("remodeling a bathroom", intent));
            assert!(content.missing_required().is_empty());
            assert!(content.title.contains("bathroom"));
        }
    }

    #[test]
    fn test_personalize_merges_interest_tags() {
        let strategy = ArticleStrategy::new();
        let mut interests = BTreeMap::new();
        interests.insert("diy".to_string(), 0.9);
        let ctx = context("tile flooring", Intent::Informational).with_interests(interests);
        let mut content = strategy.fallback_content(&ctx);
        strategy.personalize(&mut content, &ctx);
        assert_eq!(content.tags[0], "diy");
    }
}
