// * pagecraft CLI
// * Runs the page engine against a query and prints JSON

use clap::{Parser, Subcommand};
use pagecraft::engine::IntentAnalyzer;
use pagecraft::models::{DiscoveryResult, UserContext};
use pagecraft::ops::telemetry;
use pagecraft::{load_config, PageGenerationEngine, PagecraftConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Personalized page generation from a search query
#[derive(Parser)]
#[command(name = "pagecraft", version, about = "Generate personalized pages with AI components")]
struct Cli {
    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    pretty_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a page and print the result as JSON
    Generate {
        #[arg(long)]
        query: String,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON file with an array of discovery results
        #[arg(long)]
        discovery: Option<PathBuf>,

        /// JSON file with a user context object
        #[arg(long)]
        user_context: Option<PathBuf>,

        #[arg(long)]
        session: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print Prometheus metrics after the result
        #[arg(long)]
        metrics: bool,
    },

    /// Print the intent analysis for a query
    Intent {
        #[arg(long)]
        query: String,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|e| e.to_string())
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Generate {
            query,
            config,
            discovery,
            user_context,
            session,
            pretty,
            metrics,
        } => {
            let config = match config {
                Some(path) => load_config(&path).map_err(|e| e.to_string())?,
                None => PagecraftConfig::default(),
            };
            let discovery: Vec<DiscoveryResult> = match discovery {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };
            let user_context: Option<UserContext> = match user_context {
                Some(path) => Some(read_json(&path)?),
                None => None,
            };

            let engine = PageGenerationEngine::from_config(config)
                .await
                .map_err(|e| e.to_string())?;
            let result = engine
                .generate_page_content(&query, &discovery, session.as_deref(), user_context.as_ref())
                .await
                .map_err(|e| e.to_string())?;

            tracing::info!(
                auto_approve = result.meets_threshold(engine.config().generation.confidence_threshold),
                "Page ready"
            );
            println!("{}", to_json(&result, pretty)?);
            if metrics {
                print!("{}", telemetry::get_metrics_string());
            }
            Ok(())
        }
        Commands::Intent { query } => {
            let analysis = IntentAnalyzer::new().analyze(&query);
            println!("{}", to_json(&analysis, true)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.pretty_logs {
        telemetry::init_tracing_pretty();
    } else {
        telemetry::init_tracing();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pagecraft failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_printed_with_generate() {
        let cli = Cli::try_parse_from(["pagecraft", "generate", "--query", "tile", "--metrics"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate { metrics: true, .. }));
        assert!(Cli::try_parse_from(["pagecraft", "metrics"]).is_err());
    }
}
