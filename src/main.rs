//! Binary entry point for promptops.
//!
//! Serves the HTTP API and exposes the pure recommendation and comparison
//! operations on the command line.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr and print_stdout in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptops::config::{PromptOpsConfig, StoreBackendType};
use promptops::http::{self, AppState};
use promptops::models::{AbTestRequest, ModelCatalog, WeightVector};
use promptops::observability::{self, ObservabilityConfig};
use promptops::services::{PromptService, placeholder_compare, recommend};
use promptops::storage::PromptStoreFactory;
use std::path::PathBuf;
use std::process::ExitCode;

/// `PromptOps` - prompt manager with version history and model recommendation.
#[derive(Parser)]
#[command(name = "promptops")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// Store backend: memory, sqlite, or postgres.
        #[arg(long)]
        store: Option<String>,

        /// `SQLite` database path.
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// PostgreSQL connection string.
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Rank the model catalog against dimension weights.
    Recommend {
        /// Weight for output quality.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        quality: f64,

        /// Weight for latency.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        latency: f64,

        /// Weight for cost.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cost: f64,

        /// Weight for context window.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        context: f64,

        /// Weight for multimodal support.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        multimodal: f64,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Run the placeholder A/B comparison.
    AbTest {
        /// First prompt.
        prompt_a: String,
        /// Second prompt.
        prompt_b: String,
        /// Model for the first prompt.
        model_a: String,
        /// Model for the second prompt.
        model_b: String,
    },

    /// List the model catalog.
    Models,
}

fn main() -> ExitCode {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match PromptOpsConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    let _observability = match observability::init(ObservabilityConfig::from_config(
        &config,
        cli.verbose,
        expose_metrics,
    )) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: PromptOpsConfig) -> Result<()> {
    match command {
        Commands::Serve {
            port,
            store,
            db_path,
            database_url,
        } => {
            let mut config = config;
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(store) = store {
                let backend = StoreBackendType::parse(&store)
                    .with_context(|| format!("unknown store backend: {store}"))?;
                config = config.with_store_backend(backend);
            }
            if let Some(path) = db_path {
                config = config.with_db_path(path);
            }
            if let Some(url) = database_url {
                config = config.with_database_url(url);
            }
            cmd_serve(&config)
        },

        Commands::Recommend {
            quality,
            latency,
            cost,
            context,
            multimodal,
            json,
        } => cmd_recommend(
            WeightVector::new(quality, latency, cost, context, multimodal),
            json,
        ),

        Commands::AbTest {
            prompt_a,
            prompt_b,
            model_a,
            model_b,
        } => cmd_ab_test(&AbTestRequest::new(prompt_a, prompt_b, model_a, model_b)),

        Commands::Models => {
            cmd_models();
            Ok(())
        },
    }
}

/// Serves the HTTP API.
///
/// The store is built before the server runtime starts because the
/// PostgreSQL backend drives its own runtime.
fn cmd_serve(config: &PromptOpsConfig) -> Result<()> {
    let store = PromptStoreFactory::create(&config.store).context("failed to open prompt store")?;
    let service = PromptService::new(store).with_policy(config.validation);

    let runtime = tokio::runtime::Runtime::new().context("failed to create runtime")?;
    runtime.block_on(http::serve(
        config.server.socket_addr(),
        AppState::new(service),
    ))?;

    Ok(())
}

fn cmd_recommend(weights: WeightVector, json: bool) -> Result<()> {
    let result =
        recommend(&ModelCatalog::builtin(), &weights).context("model catalog is empty")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Recommended: {}", result.recommendation.model);
    println!();
    for (rank, entry) in result.ranked.iter().enumerate() {
        println!("{:>2}. {:<14} {:>8.2}", rank + 1, entry.model, entry.score);
    }
    Ok(())
}

fn cmd_ab_test(request: &AbTestRequest) -> Result<()> {
    let outcome = placeholder_compare(request);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_models() {
    println!(
        "{:<14} {:>7} {:>7} {:>4} {:>7} {:>10}",
        "MODEL", "QUALITY", "LATENCY", "COST", "CONTEXT", "MULTIMODAL"
    );
    for profile in ModelCatalog::builtin().profiles() {
        println!(
            "{:<14} {:>7} {:>7} {:>4} {:>7} {:>10}",
            profile.id,
            profile.quality,
            profile.latency,
            profile.cost,
            profile.context,
            profile.multimodal
        );
    }
}
