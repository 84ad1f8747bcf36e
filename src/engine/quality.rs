// * Page-level quality aggregation

use crate::components::ComponentResult;
use crate::models::{PersonalizationContext, QualityMetrics};
use crate::quality::{content_relevance, interest_mention_score, mean, page_confidence};

/// Aggregated page quality and the weighted page confidence
///
/// `overall_confidence` is the mean component confidence; relevance,
/// personalization and completeness are measured over the concatenated
/// page text.
pub fn score_page(
    context: &PersonalizationContext,
    components: &[ComponentResult],
) -> (QualityMetrics, f64) {
    let confidences: Vec<f64> = components.iter().map(|c| c.confidence).collect();
    let mean_confidence = mean(&confidences);

    let page_text = components
        .iter()
        .map(|c| c.content.flatten_text())
        .collect::<Vec<_>>()
        .join(" ");
    let relevance = content_relevance(&context.search_query, &page_text);
    let personalization = interest_mention_score(&context.user_interests, &page_text);
    let completeness = mean(
        &components
            .iter()
            .map(|c| c.content.completeness())
            .collect::<Vec<_>>(),
    );

    let mut metrics = QualityMetrics::new(mean_confidence, relevance, personalization, completeness);
    for component in components {
        metrics = metrics.with_component_score(component.component_type().as_str(), component.confidence);
    }

    let confidence = page_confidence(mean_confidence, relevance, personalization, completeness);
    (metrics, confidence)
}
