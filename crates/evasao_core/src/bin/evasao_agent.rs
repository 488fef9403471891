//! Evasão prediction agent CLI
//!
//! Prints the tool schema, classifies a student profile given as JSON, or
//! writes out the effective configuration.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use evasao_core::{AgentConfig, EvasionAgent, EvasionPredictionTool, StudentProfile};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "evasao-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Student dropout risk prediction agent", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Classifier artifact path (overrides config)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Encoder artifact path (overrides config)
    #[arg(long, global = true)]
    encoder: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the predict_evasion tool schema as JSON
    Schema,

    /// Classify one student profile
    Predict {
        /// JSON file with the 13 profile fields
        #[arg(short, long, conflicts_with = "json")]
        input: Option<PathBuf>,

        /// Inline JSON with the 13 profile fields
        #[arg(long)]
        json: Option<String>,
    },

    /// Write the effective configuration (file, environment and flags) as TOML
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "evasao-agent.toml")]
        output: PathBuf,
    },

    /// Print the expected feature list and the aligned vector for a profile
    Features {
        /// JSON file with the 13 profile fields
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AgentConfig::load_from_file(path).context("Failed to load configuration")?,
        None => AgentConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(model) = &cli.model {
        config.artifacts.model = model.clone();
    }
    if let Some(encoder) = &cli.encoder {
        config.artifacts.encoder = encoder.clone();
    }

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = config.env_filter(&directives);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    config.validate();

    match cli.command {
        Commands::Schema => {
            let schema = EvasionPredictionTool::schema();
            println!(
                "{}",
                serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?
            );
        }
        Commands::Predict { input, json } => {
            let arguments = read_arguments(input, json)?;
            let tool = EvasionPredictionTool::new(EvasionAgent::new(config.artifacts));
            println!("{}", tool.call(arguments));
        }
        Commands::InitConfig { output } => {
            config
                .save_to_file(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Commands::Features { input } => {
            let arguments = read_arguments(Some(input), None)?;
            let profile: StudentProfile =
                serde_json::from_value(arguments).context("Invalid student profile")?;

            let agent = EvasionAgent::new(config.artifacts);
            let context = agent.load().context("Failed to load artifacts")?;
            let features = context
                .align(&profile.to_record())
                .context("Failed to align features")?;

            info!("{} features", features.len());
            for (name, value) in context.expected_features().iter().zip(&features) {
                println!("{name}\t{value}");
            }
            println!("prediction\t{}", context.predict(&profile.to_record())?);
        }
    }

    Ok(())
}

fn read_arguments(input: Option<PathBuf>, json: Option<String>) -> Result<serde_json::Value> {
    let content = match (input, json) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(json)) => json,
        (None, None) => bail!("Either --input or --json is required"),
    };
    serde_json::from_str(&content).context("Input is not valid JSON")
}
