//! Evasão trainer CLI
//!
//! Trains the dropout classifier and writes it next to its encoder.

use anyhow::{Context, Result};
use clap::Parser;
use evasao_core::artifacts::{ArtifactPaths, DEFAULT_ENCODER_FILE, DEFAULT_MODEL_FILE};
use evasao_trainer::{save_artifacts, train_from_csv, TrainingParams};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "evasao-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random forest trainer for student dropout risk", long_about = None)]
struct Args {
    /// Input CSV dataset path (';'-separated, Latin-1)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the classifier, encoder and hashes
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Number of trees
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Candidate features per split (defaults to sqrt of the feature count)
    #[arg(long)]
    max_features: Option<usize>,

    /// Random seed for the split, bootstrap and feature sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Share of samples held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Disable bootstrap sampling
    #[arg(long)]
    no_bootstrap: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Evasão Random Forest Trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let params = TrainingParams {
        n_estimators: args.trees,
        max_depth: args.max_depth,
        min_samples_leaf: args.min_samples_leaf,
        max_features: args.max_features,
        bootstrap: !args.no_bootstrap,
        seed: args.seed,
        test_size: args.test_size,
    };

    info!("Training configuration:");
    info!("  Trees: {}", params.n_estimators);
    match params.max_depth {
        Some(depth) => info!("  Max depth: {}", depth),
        None => info!("  Max depth: unlimited"),
    }
    info!("  Min samples per leaf: {}", params.min_samples_leaf);
    info!("  Bootstrap: {}", params.bootstrap);
    info!("  Seed: {}", params.seed);
    info!("  Test size: {}", params.test_size);

    info!("═══════════════════════════════════════════");
    info!("Loading dataset from: {}", args.input.display());
    let outcome = train_from_csv(&args.input, &params).context("Training failed")?;

    for column in &outcome.preprocessing.diverging_imputation {
        warn!(
            "Imputation constant for {:?} no longer matches the data; inference keeps the frozen value",
            column
        );
    }

    match &outcome.evaluation {
        Some(report) => {
            info!("Classification report:\n{}", report);
            info!("Confusion matrix:\n{}", report.confusion);
            info!("Accuracy: {:.4}", report.accuracy);
        }
        None => warn!("No hold-out set, skipping evaluation"),
    }

    std::fs::create_dir_all(&args.output).context("Failed to create output directory")?;
    let paths = ArtifactPaths {
        model: args.output.join(DEFAULT_MODEL_FILE),
        encoder: args.output.join(DEFAULT_ENCODER_FILE),
    };
    let saved = save_artifacts(&outcome, &paths).context("Failed to write artifacts")?;

    if let Some(report) = &outcome.evaluation {
        let report_path = args.output.join("training_report.json");
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        std::fs::write(&report_path, json).context("Failed to write report")?;
        info!("Saving evaluation report to: {}", report_path.display());
    }

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed successfully");
    info!("  Model: {} ({})", saved.paths.model.display(), saved.model_hash);
    info!("  Encoder: {} ({})", saved.paths.encoder.display(), saved.encoder_hash);
    info!("  Features: {}", outcome.forest.n_features);

    Ok(())
}
