//! One-hot encoder for the fixed categorical columns
//!
//! Each encoded column owns a sorted category vocabulary captured at fit
//! time. A value maps to a block of `vocabulary.len()` indicators with a
//! single 1.0, or to an all-zero block when the value is missing or was
//! never seen during fit.

use crate::errors::{EvasionError, Result};
use crate::serialization::{canonical_json_string, hash_hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Current encoder artifact format version
pub const ENCODER_FORMAT_VERSION: i32 = 1;

/// Vocabulary of one encoded column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedColumn {
    pub name: String,
    /// Sorted, unique categories
    pub categories: Vec<String>,
}

impl EncodedColumn {
    /// Indicator names generated for this column, `<column>_<category>`.
    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |category| format!("{}_{}", self.name, category))
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .ok()
    }
}

/// Immutable one-hot encoder that ignores unknown categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub version: i32,
    pub columns: Vec<EncodedColumn>,
}

impl OneHotEncoder {
    /// Fit vocabularies from row-major values.
    ///
    /// Every row must carry one value per column; missing values do not
    /// contribute a category.
    pub fn fit(columns: &[&str], rows: &[Vec<Option<String>>]) -> Result<Self> {
        let mut vocabularies: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); columns.len()];

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(EvasionError::InvalidArtifact(format!(
                    "Row {} has {} values for {} encoded columns",
                    row_idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (vocabulary, value) in vocabularies.iter_mut().zip(row) {
                if let Some(value) = value {
                    vocabulary.insert(value.as_str());
                }
            }
        }

        let columns = columns
            .iter()
            .zip(vocabularies)
            .map(|(name, vocabulary)| EncodedColumn {
                name: name.to_string(),
                categories: vocabulary.into_iter().map(str::to_string).collect(),
            })
            .collect();

        let encoder = Self {
            version: ENCODER_FORMAT_VERSION,
            columns,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Validate encoder structure
    pub fn validate(&self) -> Result<()> {
        if self.version != ENCODER_FORMAT_VERSION {
            return Err(EvasionError::InvalidArtifact(format!(
                "Unsupported encoder version: {}",
                self.version
            )));
        }

        if self.columns.is_empty() {
            return Err(EvasionError::InvalidArtifact(
                "Encoder has no columns".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EvasionError::InvalidArtifact(format!(
                    "Duplicate encoded column: {}",
                    column.name
                )));
            }
            if column.categories.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(EvasionError::InvalidArtifact(format!(
                    "Categories of {} are not sorted and unique",
                    column.name
                )));
            }
        }

        Ok(())
    }

    /// Names of the encoded input columns, in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Indicator names, column order then category order
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(EncodedColumn::feature_names)
            .collect()
    }

    /// Total indicator width
    pub fn n_features_out(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// Encode one row, one value per column in column order.
    ///
    /// Unknown and missing values produce an all-zero block for their
    /// column; only a wrong number of values is an error.
    pub fn transform(&self, values: &[Option<&str>]) -> Result<Vec<f64>> {
        if values.len() != self.columns.len() {
            return Err(EvasionError::FeatureCount {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        let mut encoded = vec![0.0; self.n_features_out()];
        let mut offset = 0;

        for (column, value) in self.columns.iter().zip(values) {
            if let Some(position) = value.and_then(|v| column.position(v)) {
                encoded[offset + position] = 1.0;
            }
            offset += column.categories.len();
        }

        Ok(encoded)
    }

    /// Serialize to canonical JSON (sorted keys)
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(canonical_json_string(self)?)
    }

    /// BLAKE3 hex digest of the canonical JSON form
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_hex(self.to_canonical_json()?.as_bytes()))
    }

    /// Save encoder as canonical JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate an encoder from JSON
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let encoder: OneHotEncoder = serde_json::from_str(json)?;
        encoder.validate()?;
        Ok(encoder)
    }
}
