// * Component generators: one fixed pipeline, three content strategies

pub mod article;
pub mod cta;
pub mod errors;
pub mod generator;
pub mod hero;
pub mod stats;
pub mod strategy;
pub mod types;

// * Re-exports for convenient access
pub use article::{ArticleContext, ArticleStrategy, ArticleStructure};
pub use cta::{CtaContext, CtaStrategy};
pub use errors::GenerationError;
pub use generator::{validate_input, ComponentGenerate, ComponentGenerator, GeneratorSettings};
pub use hero::{HeadlineStyle, HeroContext, HeroStrategy};
pub use stats::{ComponentStatsSummary, GenerationStat, GenerationStatsLog, GenerationStatsSummary};
pub use strategy::ComponentStrategy;
pub use types::{
    ActionType, ArticleContent, ArticleFormat, ComponentContent, ComponentMetadata,
    ComponentResult, ContentSchema, CtaContent, Difficulty, HeroContent, Urgency,
};

/// Generator type aliases used by the page engine
pub type HeroGenerator = ComponentGenerator<HeroStrategy>;
pub type ArticleGenerator = ComponentGenerator<ArticleStrategy>;
pub type CtaGenerator = ComponentGenerator<CtaStrategy>;
