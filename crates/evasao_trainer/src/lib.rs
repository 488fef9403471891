//! Evasão trainer - offline random forest training
//!
//! Reads the enrollment microdata, reproduces the preprocessing the
//! inference side mirrors, fits a random forest, evaluates it on a
//! stratified hold-out, and persists the classifier and encoder artifacts.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod metrics;
pub mod preprocessing;
pub mod split;
pub mod trainer;

use evasao_core::artifacts::{write_artifact, ArtifactPaths};
use evasao_core::{Classifier, OneHotEncoder, RandomForest};
use std::path::Path;
use tracing::info;

pub use dataset::Dataset;
pub use deterministic::LcgRng;
pub use errors::{Result, TrainerError};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use preprocessing::{prepare, PreparedData, PreprocessingReport};
pub use split::{stratified_split, TrainTestSplit};
pub use trainer::{ForestTrainer, TrainingParams};

/// Everything a training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub forest: RandomForest,
    pub encoder: OneHotEncoder,
    /// Hold-out evaluation; `None` when `test_size` is 0
    pub evaluation: Option<ClassificationReport>,
    pub preprocessing: PreprocessingReport,
}

/// Digests of the persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub paths: ArtifactPaths,
    pub model_hash: String,
    pub encoder_hash: String,
}

/// Preprocess, split, fit and evaluate on an already-loaded dataset.
pub fn train_on_dataset(dataset: Dataset, params: &TrainingParams) -> Result<TrainingOutcome> {
    params.validate()?;
    let source_hash = dataset.source_hash.clone();
    let prepared = prepare(dataset)?;

    let split = if params.test_size > 0.0 {
        stratified_split(&prepared.labels, params.test_size, params.seed)
    } else {
        TrainTestSplit {
            train: (0..prepared.labels.len()).collect(),
            test: Vec::new(),
        }
    };
    info!(
        "Split: {} training samples, {} held out",
        split.train.len(),
        split.test.len()
    );

    let train_x = split::select(&prepared.features, &split.train);
    let train_y = split::select(&prepared.labels, &split.train);
    let mut forest =
        ForestTrainer::new(params.clone()).train(&train_x, &train_y, &prepared.feature_names)?;

    let evaluation = if split.test.is_empty() {
        None
    } else {
        let test_y = split::select(&prepared.labels, &split.test);
        let predictions = split
            .test
            .iter()
            .map(|&i| forest.predict(&prepared.features[i]).map(|risk| risk.class()))
            .collect::<evasao_core::Result<Vec<u8>>>()?;
        Some(ClassificationReport::from_predictions(&test_y, &predictions))
    };

    if let Some(report) = &evaluation {
        forest.metadata.metrics = report.to_metric_map();
    }
    forest.metadata.training_data_hash = source_hash;

    Ok(TrainingOutcome {
        forest,
        encoder: prepared.encoder,
        evaluation,
        preprocessing: prepared.report,
    })
}

/// Train directly from a CSV file using the provided parameters.
pub fn train_from_csv(path: &Path, params: &TrainingParams) -> Result<TrainingOutcome> {
    let dataset = Dataset::from_csv(path)?;
    info!(
        "Loaded {} rows with {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    train_on_dataset(dataset, params)
}

/// Write both artifacts as canonical JSON with BLAKE3 sidecars.
pub fn save_artifacts(outcome: &TrainingOutcome, paths: &ArtifactPaths) -> Result<SavedArtifacts> {
    for path in [&paths.model, &paths.encoder] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let model_hash = write_artifact(&paths.model, &outcome.forest.to_canonical_json()?)?;
    let encoder_hash = write_artifact(&paths.encoder, &outcome.encoder.to_canonical_json()?)?;

    Ok(SavedArtifacts {
        paths: paths.clone(),
        model_hash,
        encoder_hash,
    })
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
