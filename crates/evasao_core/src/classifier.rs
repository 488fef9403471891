//! Classifier capability and the two-valued risk outcome

use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// Message returned for the dropout class
pub const HIGH_RISK_MESSAGE: &str = "Alto risco de evasão.";

/// Message returned for the non-dropout class
pub const LOW_RISK_MESSAGE: &str = "Baixo risco de evasão.";

/// Predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Class 0, no dropout
    Low,
    /// Class 1, dropout ("evasão")
    High,
}

impl RiskLevel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn class(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::High => 1,
        }
    }

    /// Fixed human-readable label
    pub fn message(self) -> &'static str {
        match self {
            RiskLevel::Low => LOW_RISK_MESSAGE,
            RiskLevel::High => HIGH_RISK_MESSAGE,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Anything that maps a positional feature vector to a risk class.
///
/// The vector carries no column labels, so implementations rely on the
/// caller presenting features in training order.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Width of the feature vector the classifier was trained on
    fn n_features(&self) -> usize;

    /// Training-time feature names, when the artifact recorded them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict(&self, features: &[f64]) -> Result<RiskLevel>;
}
