// * Page Generation Engine
// * Intent analysis, session interests, component fan-out, assembly and page scoring

pub mod assembly;
pub mod fallback;
pub mod intent;
pub mod interests;
pub mod page;
pub mod quality;

// * Re-exports for convenient access
pub use assembly::{assemble_page, page_keywords, AssemblyError};
pub use fallback::basic_page;
pub use intent::{IntentAnalyzer, IntentScores};
pub use interests::{
    apply_query_signals, InMemoryInterestStore, InterestResolver, InterestStore,
    InterestStoreError,
};
pub use page::{build_context, EngineError, PageGenerationEngine, PageGenerationResult};
pub use quality::score_page;
