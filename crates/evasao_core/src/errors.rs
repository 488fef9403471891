//! Error types for the evasão core crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading artifacts or aligning features
#[derive(Error, Debug)]
pub enum EvasionError {
    /// Artifacts were never loaded into the agent
    #[error("Inference context not initialized: load the classifier and encoder first")]
    NotInitialized,

    /// A persisted artifact file does not exist
    #[error("{kind} artifact not found at {}", path.display())]
    MissingArtifact { kind: ArtifactKind, path: PathBuf },

    /// Sidecar hash does not match the artifact bytes
    #[error("{kind} artifact hash mismatch: expected {expected}, computed {computed}")]
    IntegrityMismatch {
        kind: ArtifactKind,
        expected: String,
        computed: String,
    },

    /// Classifier and encoder disagree on the feature layout
    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    /// Artifact content is structurally invalid
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Feature vector length differs from what the classifier expects
    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// A raw field carries a value of the wrong shape
    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which of the two persisted artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Encoder,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Classifier => write!(f, "Classifier"),
            ArtifactKind::Encoder => write!(f, "Encoder"),
        }
    }
}

/// Result type for evasão core operations
pub type Result<T> = std::result::Result<T, EvasionError>;
