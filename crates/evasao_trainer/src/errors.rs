use evasao_core::EvasionError;
use thiserror::Error;

/// Errors returned by the training pipeline.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("required column missing after preprocessing: {0}")]
    MissingColumn(String),

    #[error("preprocessing error: {0}")]
    Preprocessing(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] EvasionError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
