//! Random forest trainer
//!
//! Bagged CART trees with per-node feature sampling. Each tree draws its
//! bootstrap sample and feature subsets from its own seed, so building
//! the trees in parallel gives the same forest as building them in order.

use evasao_core::{ForestMetadata, RandomForest, Tree};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::{derive_seed, LcgRng};
use crate::errors::{Result, TrainerError};

/// Forest training configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingParams {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// Candidate features per split; `None` uses `sqrt(n_features)`
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
    /// Share of samples held out for evaluation
    pub test_size: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
            test_size: 0.2,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TrainerError::Training("n_estimators must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.test_size) {
            return Err(TrainerError::Training(format!(
                "test_size must be in [0, 1), got {}",
                self.test_size
            )));
        }
        if self.max_depth == Some(0) {
            return Err(TrainerError::Training("max_depth must be positive".to_string()));
        }
        Ok(())
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1))
    }
}

/// Random forest trainer
pub struct ForestTrainer {
    params: TrainingParams,
}

impl ForestTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fit a forest on row-major `features` with binary `labels`
    pub fn train(
        &self,
        features: &[Vec<f64>],
        labels: &[u8],
        feature_names: &[String],
    ) -> Result<RandomForest> {
        self.params.validate()?;

        if features.is_empty() {
            return Err(TrainerError::Training("no training samples".to_string()));
        }
        if features.len() != labels.len() {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let n_features = feature_names.len();
        if let Some(row) = features.iter().position(|row| row.len() != n_features) {
            return Err(TrainerError::Training(format!(
                "row {} has {} features, expected {}",
                row,
                features[row].len(),
                n_features
            )));
        }

        let tree_config = TreeConfig {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: self.params.features_per_split(n_features),
        };
        info!(
            "Training {} trees on {} samples ({} candidate features per split)",
            self.params.n_estimators,
            features.len(),
            tree_config.max_features
        );

        let builder = CartBuilder::new(features, labels, tree_config);
        let n_samples = features.len();

        let trees: Vec<Tree> = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = LcgRng::new(derive_seed(self.params.seed, tree_idx as u64));
                let indices: Vec<usize> = if self.params.bootstrap {
                    (0..n_samples).map(|_| rng.next_range(n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let tree = builder.build(&indices, &mut rng);
                debug!(tree = tree_idx, nodes = tree.nodes.len(), depth = tree.depth(), "tree built");
                tree
            })
            .collect();

        let metadata = ForestMetadata {
            created_at: chrono::Utc::now().timestamp(),
            seed: self.params.seed,
            training_samples: n_samples,
            ..ForestMetadata::default()
        };

        let forest = RandomForest::new(n_features, trees)
            .with_feature_names(feature_names.to_vec())
            .with_metadata(metadata);
        forest.validate()?;
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evasao_core::Classifier;

    fn toy_data() -> (Vec<Vec<f64>>, Vec<u8>, Vec<String>) {
        let features: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i % 10) as f64, ((i * 3) % 7) as f64, (i % 2) as f64])
            .collect();
        let labels: Vec<u8> = features.iter().map(|row| (row[0] >= 5.0) as u8).collect();
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        (features, labels, names)
    }

    #[test]
    fn test_default_params() {
        let params = TrainingParams::default();
        assert_eq!(params.n_estimators, 100);
        assert_eq!(params.seed, 42);
        assert_eq!(params.test_size, 0.2);
        assert_eq!(params.features_per_split(400), 20);
        assert_eq!(params.features_per_split(2), 1);
    }

    #[test]
    fn test_invalid_params() {
        let params = TrainingParams {
            n_estimators: 0,
            ..TrainingParams::default()
        };
        assert!(params.validate().is_err());

        let params = TrainingParams {
            test_size: 1.0,
            ..TrainingParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_forest_learns_threshold() {
        let (features, labels, names) = toy_data();
        let params = TrainingParams {
            n_estimators: 15,
            max_features: Some(3),
            ..TrainingParams::default()
        };

        let forest = ForestTrainer::new(params).train(&features, &labels, &names).unwrap();
        assert_eq!(forest.num_trees(), 15);
        assert_eq!(forest.feature_names, names);

        let correct = features
            .iter()
            .zip(&labels)
            .filter(|(row, &label)| forest.predict(row).unwrap().class() == label)
            .count();
        assert!(correct >= 57, "only {correct} of 60 correct");
    }

    #[test]
    fn test_training_is_deterministic() {
        let (features, labels, names) = toy_data();
        let params = TrainingParams {
            n_estimators: 8,
            ..TrainingParams::default()
        };

        let a = ForestTrainer::new(params.clone()).train(&features, &labels, &names).unwrap();
        let b = ForestTrainer::new(params).train(&features, &labels, &names).unwrap();
        assert_eq!(a.trees, b.trees);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let names = vec!["a".to_string(), "b".to_string()];
        let err = ForestTrainer::new(TrainingParams::default())
            .train(&[vec![1.0, 2.0], vec![1.0]], &[0, 1], &names)
            .unwrap_err();
        assert!(matches!(err, TrainerError::Training(_)));
    }

    #[test]
    fn test_unlimited_depth_on_noisy_column() {
        let n = 8000;
        let features: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64]).collect();
        let labels: Vec<u8> = (0..n).map(|i| ((i * 7919) % 13 < 6) as u8).collect();
        let params = TrainingParams {
            n_estimators: 2,
            bootstrap: false,
            ..TrainingParams::default()
        };

        let forest = ForestTrainer::new(params)
            .train(&features, &labels, &["x".to_string()])
            .unwrap();
        assert_eq!(forest.num_trees(), 2);
        assert!(forest.trees.iter().all(|tree| tree.depth() > 50));
    }
}

