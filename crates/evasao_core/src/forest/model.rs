//! Random forest classifier artifact
//!
//! The forest averages the dropout probability of its trees and predicts
//! the dropout class when the average is strictly above one half, so an
//! exact tie falls to the negative class.

use super::tree::Tree;
use crate::classifier::{Classifier, RiskLevel};
use crate::errors::{EvasionError, Result};
use crate::serialization::{canonical_json_string, hash_hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Current forest artifact format version
pub const FOREST_FORMAT_VERSION: i32 = 1;

/// Training provenance stored alongside the trees
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestMetadata {
    /// Unix timestamp of the training run
    pub created_at: i64,
    /// Seed used for bootstrap and feature sampling
    pub seed: u64,
    /// Number of training samples
    pub training_samples: usize,
    /// BLAKE3 hex digest of the raw training file
    #[serde(default)]
    pub training_data_hash: String,
    /// Evaluation metrics on the held-out split
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// Bagged ensemble of classification trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub version: i32,
    pub n_features: usize,
    /// Feature names in training order; empty when unknown
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub metadata: ForestMetadata,
}

impl RandomForest {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Self {
        Self {
            version: FOREST_FORMAT_VERSION,
            n_features,
            feature_names: Vec::new(),
            trees,
            metadata: ForestMetadata::default(),
        }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn with_metadata(mut self, metadata: ForestMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate forest structure
    pub fn validate(&self) -> Result<()> {
        if self.version != FOREST_FORMAT_VERSION {
            return Err(EvasionError::InvalidArtifact(format!(
                "Unsupported forest version: {}",
                self.version
            )));
        }

        if self.trees.is_empty() {
            return Err(EvasionError::InvalidArtifact(
                "Forest has no trees".to_string(),
            ));
        }

        if !self.feature_names.is_empty() && self.feature_names.len() != self.n_features {
            return Err(EvasionError::InvalidArtifact(format!(
                "Forest declares {} features but names {}",
                self.n_features,
                self.feature_names.len()
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                EvasionError::InvalidArtifact(format!("Tree {i} validation failed: {e}"))
            })?;
        }

        Ok(())
    }

    /// Mean dropout probability over all trees
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(EvasionError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        if self.trees.is_empty() {
            return Ok(0.0);
        }

        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Serialize forest to canonical JSON (sorted keys)
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(canonical_json_string(self)?)
    }

    /// BLAKE3 hex digest of the canonical JSON form
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_hex(self.to_canonical_json()?.as_bytes()))
    }

    /// Save forest as canonical JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate a forest from JSON
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let forest: RandomForest = serde_json::from_str(json)?;
        forest.validate()?;
        Ok(forest)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.feature_names.is_empty() {
            None
        } else {
            Some(&self.feature_names)
        }
    }

    fn predict(&self, features: &[f64]) -> Result<RiskLevel> {
        let probability = self.predict_proba(features)?;
        Ok(if probability > 0.5 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        })
    }
}
