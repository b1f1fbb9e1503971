//! Fraud Scoring Engine - Command Line Entry Point
//!
//! Scores a single transaction or a CSV/JSON batch file and prints the
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fraud_scoring_engine::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    metrics::BatchMetrics,
    BatchCoordinator, BatchResult, FraudEngine,
};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fraud-engine", version, about = "Rule-based transaction fraud scoring")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one transaction given as JSON (flat or nested in a `data` string)
    Predict {
        /// Transaction JSON, e.g. '{"amount": 1500, "merchant": "Online Store"}'
        json: String,
    },
    /// Score every transaction in a .csv or .json file
    Batch {
        path: PathBuf,
        /// Spread records across the configured worker pool
        #[arg(long)]
        parallel: bool,
    },
    /// Describe the scoring model and its configuration
    ModelInfo,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "fraud_scoring_engine={level},fraud_engine={level}",
            level = logging.level
        ))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    let found = path.exists();
    Ok((AppConfig::load_from_path(path)?, found))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_batch(coordinator: &BatchCoordinator, path: &Path, parallel: bool) -> Result<BatchResult> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let records = match extension.as_str() {
        "csv" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            fraud_scoring_engine::parser::parse_csv(file)?
        }
        "json" => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&body)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?;
            fraud_scoring_engine::parser::parse_json_batch(&value)?
        }
        other => bail!("Unsupported batch file type `{other}`, expected .csv or .json"),
    };

    if parallel {
        Ok(coordinator.evaluate_batch_parallel(records, filename).await?)
    } else {
        Ok(coordinator.evaluate_batch(records, filename))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, from_file) = load_config(&cli.config)?;
    init_logging(&config.logging)?;

    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        warn!(path = %cli.config.display(), "Configuration file not found, using defaults and environment");
    }

    let engine = Arc::new(FraudEngine::new(&config).context("Invalid configuration")?);

    match cli.command {
        Command::Predict { json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Transaction is not valid JSON")?;
            let result = engine.evaluate_single(&value)?;
            info!(
                prediction = %result.prediction,
                confidence = result.confidence,
                "Prediction made"
            );
            print_json(&result)?;
        }
        Command::Batch { path, parallel } => {
            let metrics = Arc::new(BatchMetrics::new());
            let coordinator = BatchCoordinator::new(engine, config.pipeline.workers)
                .with_metrics(metrics.clone());

            let result = run_batch(&coordinator, &path, parallel).await?;
            metrics.print_summary();
            print_json(&result)?;
        }
        Command::ModelInfo => {
            print_json(&engine.model_info())?;
        }
    }

    Ok(())
}
