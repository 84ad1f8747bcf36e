// * Core data model shared by providers, generators and the page engine
// * Every record here is an explicit struct per pipeline stage

pub mod page;
pub mod personalization;
pub mod quality;
pub mod search;

// * Re-exports for convenient access
pub use page::{PageContent, PageMetadata, PageSection, PageTemplate};
pub use personalization::{
    ComplexityLevel, ContentPreferences, DiscoveryResult, PersonalizationContext, Tone,
    UserContext,
};
pub use quality::{clamp_score, QualityMetrics};
pub use search::{ComponentType, Intent, IntentAnalysis, SearchContext};
