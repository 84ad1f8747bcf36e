// * Quality scoring shared by component generators and the page engine

pub mod scoring;

pub use scoring::{
    content_relevance, interest_mention_score, mean, overall_confidence, page_confidence,
    score_component, significant_words, DEFAULT_PERSONALIZATION_SCORE,
};
