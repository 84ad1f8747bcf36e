// * Typed component records: content schemas, metadata and results

use crate::models::{ComplexityLevel, ComponentType, QualityMetrics, Tone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "basic" | "easy" | "novice" => Some(Difficulty::Beginner),
            "intermediate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "expert" | "hard" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl From<ComplexityLevel> for Difficulty {
    fn from(level: ComplexityLevel) -> Self {
        match level {
            ComplexityLevel::Beginner => Difficulty::Beginner,
            ComplexityLevel::Intermediate => Difficulty::Intermediate,
            ComplexityLevel::Advanced => Difficulty::Advanced,
        }
    }
}

/// Article format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleFormat {
    #[default]
    Guide,
    Tutorial,
    Overview,
    Analysis,
}

impl ArticleFormat {
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "guide" | "how-to" | "howto" => Some(ArticleFormat::Guide),
            "tutorial" => Some(ArticleFormat::Tutorial),
            "overview" | "summary" => Some(ArticleFormat::Overview),
            "analysis" | "comparison" | "review" => Some(ArticleFormat::Analysis),
            _ => None,
        }
    }
}

/// CTA urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Urgency::Low),
            "medium" | "normal" | "moderate" => Some(Urgency::Medium),
            "high" | "urgent" => Some(Urgency::High),
            _ => None,
        }
    }
}

/// What the CTA asks the reader to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Purchase,
    #[default]
    LearnMore,
    Explore,
    Subscribe,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Purchase => "purchase",
            ActionType::LearnMore => "learn_more",
            ActionType::Explore => "explore",
            ActionType::Subscribe => "subscribe",
        }
    }

    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "purchase" | "buy" | "shop" => Some(ActionType::Purchase),
            "learn_more" | "learn" => Some(ActionType::LearnMore),
            "explore" | "browse" => Some(ActionType::Explore),
            "subscribe" | "signup" | "sign_up" => Some(ActionType::Subscribe),
            _ => None,
        }
    }
}

/// Field-level contract shared by every content type
pub trait ContentSchema: Clone + Send + Sync + 'static {
    /// `(field name, value)` for each required field
    fn required_values(&self) -> Vec<(&'static str, &str)>;

    /// Copies fallback values into required fields that are empty
    fn fill_required_from(&mut self, fallback: &Self);

    /// All text of the content, space separated
    fn flatten_text(&self) -> String;

    fn into_content(self) -> ComponentContent;

    fn missing_required(&self) -> Vec<&'static str> {
        self.required_values()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Fraction of required fields present and non-empty
    fn completeness(&self) -> f64 {
        let required = self.required_values();
        if required.is_empty() {
            return 1.0;
        }
        let present = required
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .count();
        present as f64 / required.len() as f64
    }
}

// * Replaces an empty field with the fallback's value
fn fill(target: &mut String, fallback: &str) {
    if target.trim().is_empty() {
        *target = fallback.to_string();
    }
}

fn join_text(parts: &[&str], lists: &[&[String]]) -> String {
    parts
        .iter()
        .copied()
        .chain(lists.iter().flat_map(|list| list.iter().map(String::as_str)))
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_url: String,
    pub tone: Tone,
    pub visual_theme: String,
    pub tags: Vec<String>,
}

impl ContentSchema for HeroContent {
    fn required_values(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("headline", self.headline.as_str()),
            ("subheadline", self.subheadline.as_str()),
            ("cta_text", self.cta_text.as_str()),
        ]
    }

    fn fill_required_from(&mut self, fallback: &Self) {
        fill(&mut self.headline, &fallback.headline);
        fill(&mut self.subheadline, &fallback.subheadline);
        fill(&mut self.cta_text, &fallback.cta_text);
        fill(&mut self.cta_url, &fallback.cta_url);
    }

    fn flatten_text(&self) -> String {
        join_text(
            &[
                self.headline.as_str(),
                self.subheadline.as_str(),
                self.cta_text.as_str(),
                self.visual_theme.as_str(),
            ],
            &[self.tags.as_slice()],
        )
    }

    fn into_content(self) -> ComponentContent {
        ComponentContent::Hero(self)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleContent {
    pub title: String,
    pub summary: String,
    pub introduction: String,
    pub main_content: String,
    pub key_points: Vec<String>,
    pub related_topics: Vec<String>,
    /// Minutes
    pub reading_time: u32,
    pub difficulty_level: Difficulty,
    pub content_type: ArticleFormat,
    pub tags: Vec<String>,
}

impl ContentSchema for ArticleContent {
    fn required_values(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", self.title.as_str()),
            ("summary", self.summary.as_str()),
            ("introduction", self.introduction.as_str()),
            ("main_content", self.main_content.as_str()),
        ]
    }

    fn fill_required_from(&mut self, fallback: &Self) {
        fill(&mut self.title, &fallback.title);
        fill(&mut self.summary, &fallback.summary);
        fill(&mut self.introduction, &fallback.introduction);
        fill(&mut self.main_content, &fallback.main_content);
        if self.reading_time == 0 {
            self.reading_time = fallback.reading_time.max(1);
        }
    }

    fn flatten_text(&self) -> String {
        join_text(
            &[
                self.title.as_str(),
                self.summary.as_str(),
                self.introduction.as_str(),
                self.main_content.as_str(),
            ],
            &[
                self.key_points.as_slice(),
                self.related_topics.as_slice(),
                self.tags.as_slice(),
            ],
        )
    }

    fn into_content(self) -> ComponentContent {
        ComponentContent::Article(self)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CtaContent {
    pub headline: String,
    pub description: String,
    pub button_text: String,
    pub button_url: String,
    pub urgency: Urgency,
    pub action_type: ActionType,
    pub supporting_points: Vec<String>,
    pub tags: Vec<String>,
}

impl ContentSchema for CtaContent {
    fn required_values(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("headline", self.headline.as_str()),
            ("description", self.description.as_str()),
            ("button_text", self.button_text.as_str()),
        ]
    }

    fn fill_required_from(&mut self, fallback: &Self) {
        fill(&mut self.headline, &fallback.headline);
        fill(&mut self.description, &fallback.description);
        fill(&mut self.button_text, &fallback.button_text);
        fill(&mut self.button_url, &fallback.button_url);
    }

    fn flatten_text(&self) -> String {
        join_text(
            &[
                self.headline.as_str(),
                self.description.as_str(),
                self.button_text.as_str(),
            ],
            &[self.supporting_points.as_slice(), self.tags.as_slice()],
        )
    }

    fn into_content(self) -> ComponentContent {
        ComponentContent::Cta(self)
    }
}

/// Content of any component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentContent {
    Hero(HeroContent),
    Article(ArticleContent),
    Cta(CtaContent),
}

impl ComponentContent {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentContent::Hero(_) => ComponentType::Hero,
            ComponentContent::Article(_) => ComponentType::Article,
            ComponentContent::Cta(_) => ComponentType::Cta,
        }
    }

    /// Primary heading of the component
    pub fn title(&self) -> &str {
        match self {
            ComponentContent::Hero(c) => &c.headline,
            ComponentContent::Article(c) => &c.title,
            ComponentContent::Cta(c) => &c.headline,
        }
    }

    /// One-sentence description of the component
    pub fn description(&self) -> &str {
        match self {
            ComponentContent::Hero(c) => &c.subheadline,
            ComponentContent::Article(c) => &c.summary,
            ComponentContent::Cta(c) => &c.description,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            ComponentContent::Hero(c) => &c.tags,
            ComponentContent::Article(c) => &c.tags,
            ComponentContent::Cta(c) => &c.tags,
        }
    }

    pub fn flatten_text(&self) -> String {
        match self {
            ComponentContent::Hero(c) => c.flatten_text(),
            ComponentContent::Article(c) => c.flatten_text(),
            ComponentContent::Cta(c) => c.flatten_text(),
        }
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        match self {
            ComponentContent::Hero(c) => c.missing_required(),
            ComponentContent::Article(c) => c.missing_required(),
            ComponentContent::Cta(c) => c.missing_required(),
        }
    }

    pub fn completeness(&self) -> f64 {
        match self {
            ComponentContent::Hero(c) => c.completeness(),
            ComponentContent::Article(c) => c.completeness(),
            ComponentContent::Cta(c) => c.completeness(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub component_type: ComponentType,
    pub ai_provider: Option<String>,
    /// Seconds
    pub generation_time: f64,
    pub quality_metrics: Option<QualityMetrics>,
    pub cache_key: String,
    pub generated_at: DateTime<Utc>,
    pub error_occurred: bool,
}

/// Outcome of one component generation; fallbacks are results too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResult {
    pub success: bool,
    pub content: ComponentContent,
    pub error: Option<String>,
    pub metadata: ComponentMetadata,
    pub confidence: f64,
    #[serde(default)]
    pub from_cache: bool,
}

impl ComponentResult {
    pub fn component_type(&self) -> ComponentType {
        self.metadata.component_type
    }

    /// True when the content came from the fallback path
    pub fn is_fallback(&self) -> bool {
        self.metadata.error_occurred
    }
}
