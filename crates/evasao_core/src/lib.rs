//! Student dropout ("evasão") risk prediction core
//!
//! Loads a trained classifier and one-hot encoder and turns a single raw
//! enrollment record into one of two fixed risk messages.
//!
//! Modules:
//! - `text`: mojibake repair and category cleaning
//! - `schema`: fixed column names, feature partition and label derivation
//! - `record`: raw input records and the typed student profile
//! - `imputation`: frozen training-time fill constants
//! - `encoder`: one-hot encoder artifact
//! - `forest`: random forest classifier artifact
//! - `classifier`: classifier capability and risk outcome
//! - `alignment`: feature vector assembly in training order
//! - `artifacts`: artifact paths, integrity checks and the inference context
//! - `agent`: prediction entry point with lazy, idempotent loading
//! - `tool`: tool schema exposure for agent orchestrators
//! - `config`: TOML configuration for the agent binary

pub mod agent;
pub mod alignment;
pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod forest;
pub mod imputation;
pub mod record;
pub mod schema;
pub mod serialization;
pub mod text;
pub mod tool;

pub use agent::{EvasionAgent, INTERNAL_ERROR_MESSAGE};
pub use alignment::{expected_feature_list, FeatureAligner};
pub use artifacts::{ArtifactPaths, InferenceContext};
pub use classifier::{Classifier, RiskLevel, HIGH_RISK_MESSAGE, LOW_RISK_MESSAGE};
pub use config::AgentConfig;
pub use encoder::OneHotEncoder;
pub use errors::{ArtifactKind, EvasionError, Result};
pub use forest::{ForestMetadata, Node, RandomForest, Tree};
pub use imputation::ImputationProfile;
pub use record::{RawRecord, RawValue, StudentProfile};
pub use schema::derive_label;
pub use text::{clean_category, normalize_text};
pub use tool::{EvasionPredictionTool, ToolSchema};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
