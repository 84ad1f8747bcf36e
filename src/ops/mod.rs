// * Operations: structured logging and Prometheus metrics

pub mod telemetry;

pub use telemetry::{
    get_metrics_string, init_tracing, init_tracing_pretty, init_tracing_with_level,
};
