//! Missing-value imputation
//!
//! Fill constants are statistics of the training population. Inference
//! sees one record at a time, so it reuses the constants captured at
//! training time verbatim ([`ImputationProfile::frozen`]).

use crate::record::{RawRecord, RawValue};
use crate::schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Training-time median of `Carga Horaria Mínima`
pub const MEDIAN_CARGA_HORARIA_MINIMA: f64 = 1000.0;

/// Training-time mode of both technology-axis columns
pub const MODE_EIXO: &str = "Desenvolvimento Educacional e Social";

/// Training-time mode of `Fator Esforço Curso`
pub const MODE_FATOR_ESFORCO: &str = "1";

/// Fill values per column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationProfile {
    /// Median fill for numeric columns
    pub numeric_medians: BTreeMap<String, f64>,
    /// Most-frequent fill for categorical columns
    pub categorical_modes: BTreeMap<String, String>,
}

impl ImputationProfile {
    /// The constants captured from the shipped training run.
    pub fn frozen() -> Self {
        let mut numeric_medians = BTreeMap::new();
        numeric_medians.insert(
            schema::CARGA_HORARIA_MINIMA.to_string(),
            MEDIAN_CARGA_HORARIA_MINIMA,
        );

        let mut categorical_modes = BTreeMap::new();
        categorical_modes.insert(schema::SUBEIXO_TECNOLOGICO.to_string(), MODE_EIXO.to_string());
        categorical_modes.insert(schema::EIXO_TECNOLOGICO.to_string(), MODE_EIXO.to_string());
        categorical_modes.insert(
            schema::FATOR_ESFORCO_CURSO.to_string(),
            MODE_FATOR_ESFORCO.to_string(),
        );

        Self {
            numeric_medians,
            categorical_modes,
        }
    }

    /// Fill absent designated fields; present values are never touched.
    pub fn apply(&self, record: &RawRecord) -> RawRecord {
        let mut filled = record.clone();

        for (column, median) in &self.numeric_medians {
            if record.get(column).is_none() {
                filled.insert(column.clone(), RawValue::Float(*median));
            }
        }

        for (column, mode) in &self.categorical_modes {
            if record.get(column).is_none() {
                filled.insert(column.clone(), RawValue::Text(mode.clone()));
            }
        }

        filled
    }

    /// Columns whose fill value differs from `other`
    pub fn diverging_columns(&self, other: &ImputationProfile) -> Vec<String> {
        let mut diverging = Vec::new();

        for (column, median) in &self.numeric_medians {
            match other.numeric_medians.get(column) {
                Some(theirs) if theirs == median => {}
                _ => diverging.push(column.clone()),
            }
        }

        for (column, mode) in &self.categorical_modes {
            match other.categorical_modes.get(column) {
                Some(theirs) if theirs == mode => {}
                _ => diverging.push(column.clone()),
            }
        }

        diverging
    }
}

/// Median of the present values; `None` when there are none.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties go to the smallest value.
pub fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        // BTreeMap iterates in ascending order, so strict > keeps the smallest on ties
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}
