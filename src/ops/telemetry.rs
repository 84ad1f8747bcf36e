// * Telemetry - JSON Logging and Prometheus Metrics
// * Structured logging setup plus the counters/histograms the generation pipeline feeds

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec,
    TextEncoder,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// * Generation latency buckets (seconds); provider calls dominate and run up to a minute
const GENERATION_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

lazy_static! {
    // * Component generations by type and outcome (success | fallback | cache_hit)
    pub static ref COMPONENTS_GENERATED_TOTAL: CounterVec = register_counter_vec!(
        "pagecraft_components_generated_total",
        "Component generations by component type and outcome",
        &["component_type", "outcome"]
    ).unwrap();

    // * Component generation duration
    pub static ref GENERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "pagecraft_generation_duration_seconds",
        "Component generation duration in seconds",
        &["component_type"],
        GENERATION_BUCKETS.to_vec()
    ).unwrap();

    // * Provider calls by provider and status
    pub static ref PROVIDER_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "pagecraft_provider_requests_total",
        "AI provider requests by provider and status",
        &["provider", "status"]
    ).unwrap();

    // * Tokens consumed per provider
    pub static ref PROVIDER_TOKENS_TOTAL: CounterVec = register_counter_vec!(
        "pagecraft_provider_tokens_total",
        "Total tokens reported by AI providers",
        &["provider"]
    ).unwrap();

    // * Pages assembled by template
    pub static ref PAGES_GENERATED_TOTAL: CounterVec = register_counter_vec!(
        "pagecraft_pages_generated_total",
        "Pages generated by template",
        &["template"]
    ).unwrap();

    // * Page generation duration
    pub static ref PAGE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "pagecraft_page_duration_seconds",
        "End-to-end page generation duration in seconds",
        &["template"],
        GENERATION_BUCKETS.to_vec()
    ).unwrap();

    // * Cache lookups by result (hit | miss | error)
    pub static ref CACHE_LOOKUPS_TOTAL: CounterVec = register_counter_vec!(
        "pagecraft_cache_lookups_total",
        "Component cache lookups by result",
        &["result"]
    ).unwrap();
}

/// Initializes the tracing subscriber with JSON formatting
///
/// Safe to call more than once; later calls are ignored.
///
/// # Example
/// ```ignore
/// use pagecraft::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(query = "remodeling a bathroom", "Generating page");
/// ```
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing with custom log level
pub fn init_tracing_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init();
}

/// Initializes tracing with pretty formatting (for development)
pub fn init_tracing_pretty() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .try_init();
}

/// Returns the current metrics in the Prometheus text exposition format
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Records the outcome of one component generation
pub fn record_component_outcome(component_type: &str, outcome: &str) {
    COMPONENTS_GENERATED_TOTAL
        .with_label_values(&[component_type, outcome])
        .inc();
}

/// Records component generation duration
pub fn record_generation_duration(component_type: &str, seconds: f64) {
    GENERATION_DURATION_SECONDS
        .with_label_values(&[component_type])
        .observe(seconds);
}

/// Records a provider call by status (`success` or a `ProviderError` kind)
pub fn record_provider_request(provider: &str, status: &str) {
    PROVIDER_REQUESTS_TOTAL
        .with_label_values(&[provider, status])
        .inc();
}

/// Records tokens consumed by a provider
pub fn record_provider_tokens(provider: &str, tokens: u64) {
    PROVIDER_TOKENS_TOTAL
        .with_label_values(&[provider])
        .inc_by(tokens as f64);
}

/// Records a completed page
pub fn record_page_generated(template: &str, seconds: f64) {
    PAGES_GENERATED_TOTAL.with_label_values(&[template]).inc();
    PAGE_DURATION_SECONDS
        .with_label_values(&[template])
        .observe(seconds);
}

/// Records a cache lookup
pub fn record_cache_lookup(result: &str) {
    CACHE_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_component_outcome() {
        let before = COMPONENTS_GENERATED_TOTAL
            .with_label_values(&["hero", "telemetry_test"])
            .get();
        record_component_outcome("hero", "telemetry_test");
        let after = COMPONENTS_GENERATED_TOTAL
            .with_label_values(&["hero", "telemetry_test"])
            .get();
        assert!(after >= before + 1.0);
    }

    #[test]
    fn test_record_provider_tokens() {
        record_provider_tokens("telemetry_test", 120);
        let value = PROVIDER_TOKENS_TOTAL
            .with_label_values(&["telemetry_test"])
            .get();
        assert!(value >= 120.0);
    }

    #[test]
    fn test_record_durations() {
        record_generation_duration("article", 1.5);
        record_page_generated("basic", 0.2);
        // * Histograms should be updated
    }

    #[test]
    fn test_get_metrics_string() {
        record_cache_lookup("miss");
        let metrics = get_metrics_string();
        assert!(metrics.contains("pagecraft_cache_lookups_total"));
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing();
        init_tracing_pretty();
    }
}
