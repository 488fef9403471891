//! Configuration for the prediction agent

use crate::artifacts::ArtifactPaths;
use crate::errors::{EvasionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the classifier path
pub const ENV_MODEL_PATH: &str = "EVASAO_MODEL_PATH";

/// Environment variable overriding the encoder path
pub const ENV_ENCODER_PATH: &str = "EVASAO_ENCODER_PATH";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "EVASAO_LOG_LEVEL";

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Artifact locations
    pub artifacts: ArtifactPaths,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AgentConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| EvasionError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| EvasionError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EvasionError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        info!("Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Apply overrides from process environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL_PATH) {
            self.artifacts.model = PathBuf::from(model);
        }
        if let Some(encoder) = lookup(ENV_ENCODER_PATH) {
            self.artifacts.encoder = PathBuf::from(encoder);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.to_lowercase();
        }
    }

    /// Non-fatal problems with the configuration
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            warnings.push(format!(
                "Unknown log level {:?}, falling back to info",
                self.logging.level
            ));
        }

        if self.artifacts.model == self.artifacts.encoder {
            warnings.push("Classifier and encoder point at the same file".to_string());
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        warnings
    }

    /// Configured level as a `tracing` level
    pub fn log_level(&self) -> tracing::Level {
        match self.logging.level.as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }

    /// Log filter built from `directives` (usually `RUST_LOG`), falling back
    /// to the configured level when there are none
    pub fn env_filter(&self, directives: &str) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.log_level()).into())
            .parse_lossy(directives)
    }
}
