//! Training-time preprocessing
//!
//! Turns the raw microdata table into a labelled feature matrix whose
//! columns follow the same layout inference rebuilds: the four numeric
//! passthrough columns, then the encoder's indicator columns.

use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};
use evasao_core::imputation::{median, mode};
use evasao_core::schema::{
    CATEGORICAL_FEATURES, DISCARDED_COLUMNS, NUMERIC_FEATURES, STATUS_COLUMN,
};
use evasao_core::{
    clean_category, derive_label, expected_feature_list, ImputationProfile, OneHotEncoder,
    RawValue,
};
use tracing::{debug, info, warn};

/// Columns with a larger share of missing cells are dropped
pub const MAX_MISSING_FRACTION: f64 = 0.9;

/// Name of the derived label in logs and reports
pub const LABEL_NAME: &str = "Evasao";

/// Name the status column is reported under
pub const STATUS_ALIAS: &str = "Status_Aluno";

/// What preprocessing removed or filled
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreprocessingReport {
    /// Identifier, date and free-text columns removed up front
    pub dropped_discarded: Vec<String>,
    pub dropped_sparse: Vec<String>,
    pub dropped_constant: Vec<String>,
    pub filled: Vec<(String, usize)>,
    /// Columns whose fitted fill value differs from the frozen inference constants
    pub diverging_imputation: Vec<String>,
    pub positives: usize,
    pub negatives: usize,
}

/// Labelled feature matrix ready for training
#[derive(Clone, Debug)]
pub struct PreparedData {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub feature_names: Vec<String>,
    pub encoder: OneHotEncoder,
    pub imputation: ImputationProfile,
    pub report: PreprocessingReport,
}

/// Fill statistics computed from the data for the columns inference imputes
pub fn fit_imputation(dataset: &Dataset) -> ImputationProfile {
    let frozen = ImputationProfile::frozen();
    let mut fitted = ImputationProfile::default();

    for column in frozen.numeric_medians.keys() {
        let Some(cells) = dataset.column(column) else {
            continue;
        };
        let values: Vec<f64> = cells
            .iter()
            .flatten()
            .filter_map(|cell| RawValue::from(*cell).as_f64())
            .collect();
        if let Some(m) = median(&values) {
            fitted.numeric_medians.insert(column.clone(), m);
        }
    }

    for column in frozen.categorical_modes.keys() {
        let Some(cells) = dataset.column(column) else {
            continue;
        };
        let cleaned: Vec<String> = cells.iter().flatten().map(|cell| clean_category(cell)).collect();
        if let Some(m) = mode(cleaned.iter().map(String::as_str)) {
            fitted.categorical_modes.insert(column.clone(), m);
        }
    }

    fitted
}

/// Run the full preprocessing pipeline.
pub fn prepare(mut dataset: Dataset) -> Result<PreparedData> {
    let mut report = PreprocessingReport::default();

    let status = dataset
        .column(STATUS_COLUMN)
        .ok_or_else(|| TrainerError::MissingColumn(STATUS_COLUMN.to_string()))?;
    let labels: Vec<u8> = status
        .iter()
        .map(|cell| cell.map(derive_label).unwrap_or(0))
        .collect();
    report.positives = labels.iter().filter(|&&l| l == 1).count();
    report.negatives = labels.len() - report.positives;
    info!(
        "{} -> {}: {} dropouts, {} other outcomes",
        STATUS_ALIAS, LABEL_NAME, report.positives, report.negatives
    );

    report.dropped_discarded = dataset
        .columns
        .iter()
        .filter(|name| DISCARDED_COLUMNS.contains(&name.as_str()))
        .cloned()
        .collect();
    dataset.drop_columns(&report.dropped_discarded);
    if !report.dropped_discarded.is_empty() {
        debug!("Dropped identifier columns: {:?}", report.dropped_discarded);
    }

    report.dropped_sparse = dataset
        .missing_fractions()
        .into_iter()
        .filter(|(name, fraction)| *fraction > MAX_MISSING_FRACTION && name != STATUS_COLUMN)
        .map(|(name, _)| name)
        .collect();
    dataset.drop_columns(&report.dropped_sparse);
    if !report.dropped_sparse.is_empty() {
        info!("Dropped columns with >90% missing: {:?}", report.dropped_sparse);
    }

    for column in CATEGORICAL_FEATURES {
        dataset.map_column(column, clean_category);
    }

    let imputation = fit_imputation(&dataset);
    report.diverging_imputation = imputation.diverging_columns(&ImputationProfile::frozen());
    for column in &report.diverging_imputation {
        warn!(
            "Fitted fill value for {:?} differs from the frozen inference constant",
            column
        );
    }

    for (column, value) in &imputation.numeric_medians {
        let filled = dataset.fill_missing(column, &value.to_string());
        report.filled.push((column.clone(), filled));
    }
    for (column, value) in &imputation.categorical_modes {
        let filled = dataset.fill_missing(column, value);
        report.filled.push((column.clone(), filled));
    }

    report.dropped_constant = dataset
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, name)| name.as_str() != STATUS_COLUMN && dataset.distinct_count(*idx) == 1)
        .map(|(_, name)| name.clone())
        .collect();
    dataset.drop_columns(&report.dropped_constant);
    if !report.dropped_constant.is_empty() {
        info!("Dropped constant columns: {:?}", report.dropped_constant);
    }

    for column in NUMERIC_FEATURES.iter().chain(CATEGORICAL_FEATURES.iter()) {
        if !dataset.has_column(column) {
            return Err(TrainerError::MissingColumn(column.to_string()));
        }
    }

    let categorical_idx: Vec<usize> = CATEGORICAL_FEATURES
        .iter()
        .filter_map(|c| dataset.column_index(c))
        .collect();
    let numeric_idx: Vec<usize> = NUMERIC_FEATURES
        .iter()
        .filter_map(|c| dataset.column_index(c))
        .collect();

    let categorical_rows: Vec<Vec<Option<String>>> = dataset
        .rows
        .iter()
        .map(|row| categorical_idx.iter().map(|&i| row[i].clone()).collect())
        .collect();
    let encoder = OneHotEncoder::fit(&CATEGORICAL_FEATURES, &categorical_rows)?;

    let mut features = Vec::with_capacity(dataset.len());
    for (row_idx, (row, categories)) in dataset.rows.iter().zip(&categorical_rows).enumerate() {
        let mut vector = Vec::with_capacity(NUMERIC_FEATURES.len() + encoder.n_features_out());
        for (&col, name) in numeric_idx.iter().zip(NUMERIC_FEATURES) {
            let value = match &row[col] {
                None => 0.0,
                Some(cell) => RawValue::from(cell.as_str()).as_f64().ok_or_else(|| {
                    TrainerError::Preprocessing(format!(
                        "row {}: {:?} is not a number in {}",
                        row_idx + 1,
                        cell,
                        name
                    ))
                })?,
            };
            vector.push(value);
        }
        let refs: Vec<Option<&str>> = categories.iter().map(Option::as_deref).collect();
        vector.extend(encoder.transform(&refs)?);
        features.push(vector);
    }

    let feature_names = expected_feature_list(&encoder);
    info!(
        "Prepared {} samples with {} features ({} numeric, {} indicators)",
        features.len(),
        feature_names.len(),
        NUMERIC_FEATURES.len(),
        encoder.n_features_out()
    );

    Ok(PreparedData {
        features,
        labels,
        feature_names,
        encoder,
        imputation,
        report,
    })
}
