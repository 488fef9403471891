//! Feature alignment for single-record inference
//!
//! Reproduces, for one raw record, the row the training pipeline would have
//! built: same cleaning, same imputation constants, same (loaded, never
//! refit) encoder, and above all the same column order. The classifier only
//! sees a positional `f64` array, so a vector with the right values in the
//! wrong order silently produces wrong predictions.

use crate::encoder::OneHotEncoder;
use crate::errors::{EvasionError, Result};
use crate::imputation::ImputationProfile;
use crate::record::{RawRecord, RawValue};
use crate::schema::{self, CATEGORICAL_FEATURES, NUMERIC_FEATURES, RAW_INPUT_FIELDS};
use crate::text::clean_category;
use std::collections::HashMap;
use tracing::debug;

/// Numeric passthrough names followed by the encoder's indicator names.
pub fn expected_feature_list(encoder: &OneHotEncoder) -> Vec<String> {
    NUMERIC_FEATURES
        .iter()
        .map(|name| name.to_string())
        .chain(encoder.feature_names_out())
        .collect()
}

/// Turns raw records into feature vectors in training order
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    encoder: OneHotEncoder,
    imputation: ImputationProfile,
    expected: Vec<String>,
}

impl FeatureAligner {
    /// Build an aligner around a loaded encoder; the expected feature list
    /// is derived here once and never regenerated.
    pub fn new(encoder: OneHotEncoder, imputation: ImputationProfile) -> Self {
        let expected = expected_feature_list(&encoder);
        Self {
            encoder,
            imputation,
            expected,
        }
    }

    pub fn expected_features(&self) -> &[String] {
        &self.expected
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn imputation(&self) -> &ImputationProfile {
        &self.imputation
    }

    /// Restrict, clean and impute a raw record.
    pub fn prepare(&self, record: &RawRecord) -> RawRecord {
        let mut prepared = RawRecord::new();

        for field in RAW_INPUT_FIELDS {
            let Some(value) = record.get(field) else {
                continue;
            };
            if schema::is_categorical(field) {
                prepared.insert(field, RawValue::Text(clean_category(&value.as_category())));
            } else {
                prepared.insert(field, value.clone());
            }
        }

        self.imputation.apply(&prepared)
    }

    /// Feature vector for one record, in exactly the expected order.
    ///
    /// Positions not populated from the record stay at 0.0. Unknown or
    /// missing categories leave their whole indicator block at zero.
    pub fn align(&self, record: &RawRecord) -> Result<Vec<f64>> {
        let prepared = self.prepare(record);

        let mut numeric: HashMap<&str, f64> = HashMap::with_capacity(NUMERIC_FEATURES.len());
        for field in NUMERIC_FEATURES {
            if let Some(value) = prepared.get(field) {
                let parsed = value.as_f64().ok_or_else(|| EvasionError::InvalidField {
                    field: field.to_string(),
                    value: value.as_category(),
                })?;
                numeric.insert(field, parsed);
            }
        }

        let categories: Vec<Option<String>> = self
            .encoder
            .columns
            .iter()
            .map(|column| prepared.get(&column.name).map(RawValue::as_category))
            .collect();
        let category_refs: Vec<Option<&str>> = categories.iter().map(Option::as_deref).collect();
        let encoded_values = self.encoder.transform(&category_refs)?;
        let encoded: HashMap<String, f64> = self
            .encoder
            .feature_names_out()
            .into_iter()
            .zip(encoded_values)
            .collect();

        let mut features = vec![0.0; self.expected.len()];
        for (slot, name) in features.iter_mut().zip(&self.expected) {
            if let Some(value) = numeric.get(name.as_str()) {
                *slot = *value;
            } else if let Some(value) = encoded.get(name) {
                *slot = *value;
            }
        }

        debug!(
            features = features.len(),
            active_indicators = encoded.values().filter(|v| **v > 0.0).count(),
            "aligned record"
        );

        Ok(features)
    }

    /// Encoder columns whose value in `record` is not part of the vocabulary.
    pub fn unknown_categories(&self, record: &RawRecord) -> Vec<String> {
        let prepared = self.prepare(record);
        self.encoder
            .columns
            .iter()
            .filter(|column| CATEGORICAL_FEATURES.contains(&column.name.as_str()))
            .filter_map(|column| {
                let value = prepared.get(&column.name)?.as_category();
                if column.categories.binary_search(&value).is_err() {
                    Some(column.name.clone())
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn fit_row(values: [&str; 9]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn create_test_encoder() -> OneHotEncoder {
        OneHotEncoder::fit(
            &CATEGORICAL_FEATURES,
            &[
                fit_row([
                    "1",
                    "Público",
                    "Presencial",
                    "Feminino",
                    "Técnico",
                    "Regular",
                    "SP",
                    "Gestão e Negócios",
                    "Comércio",
                ]),
                fit_row([
                    "3",
                    "Privado",
                    "EAD",
                    "Masculino",
                    "FIC",
                    "PRONATEC",
                    "RJ",
                    "Desenvolvimento Educacional e Social",
                    "Desenvolvimento Educacional e Social",
                ]),
            ],
        )
        .unwrap()
    }

    fn aligner() -> FeatureAligner {
        FeatureAligner::new(create_test_encoder(), ImputationProfile::frozen())
    }

    fn full_record() -> RawRecord {
        RawRecord::new()
            .with(CARGA_HORARIA, 1000)
            .with(CARGA_HORARIA_MINIMA, 800.0)
            .with(FATOR_ESFORCO_CURSO, "1")
            .with(FONTE_FINANCIAMENTO, "Público")
            .with(MODALIDADE_ENSINO, "Presencial")
            .with(SEXO, "Feminino")
            .with(TIPO_CURSO, "Técnico")
            .with(TIPO_OFERTA, "Regular")
            .with(UF, "SP")
            .with(EIXO_TECNOLOGICO, "Gestão e Negócios")
            .with(SUBEIXO_TECNOLOGICO, "Comércio")
            .with(NUMERO_REGISTROS, 5)
            .with(CODIGO_UNIDADE_SISTEC, 26437)
    }

    fn value_of(aligner: &FeatureAligner, features: &[f64], name: &str) -> f64 {
        let idx = aligner
            .expected_features()
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{name} not in expected features"));
        features[idx]
    }

    #[test]
    fn test_expected_list_starts_with_numeric() {
        let aligner = aligner();
        let expected = aligner.expected_features();
        assert_eq!(&expected[..4], &NUMERIC_FEATURES.map(String::from));
        assert_eq!(expected[4], "Fator Esforço Curso_1");
        assert_eq!(expected.len(), 4 + aligner.encoder().n_features_out());
    }

    #[test]
    fn test_align_full_record() {
        let aligner = aligner();
        let features = aligner.align(&full_record()).unwrap();

        assert_eq!(features.len(), aligner.expected_features().len());
        assert_eq!(&features[..4], &[1000.0, 800.0, 5.0, 26437.0]);
        assert_eq!(value_of(&aligner, &features, "UF_SP"), 1.0);
        assert_eq!(value_of(&aligner, &features, "UF_RJ"), 0.0);
        assert_eq!(value_of(&aligner, &features, "Sexo_Feminino"), 1.0);
        // one indicator per categorical column
        assert_eq!(features[4..].iter().sum::<f64>(), 9.0);
    }

    #[test]
    fn test_align_repairs_mojibake_before_encoding() {
        let aligner = aligner();
        let record = full_record()
            .with(TIPO_CURSO, "TÃ©cnico")
            .with(FONTE_FINANCIAMENTO, "PÃºblico");
        let features = aligner.align(&record).unwrap();
        assert_eq!(value_of(&aligner, &features, "Tipo de Curso_Técnico"), 1.0);
        assert_eq!(value_of(&aligner, &features, "Fonte de Financiamento_Público"), 1.0);
    }

    #[test]
    fn test_unknown_category_zero_block() {
        let aligner = aligner();
        let record = full_record().with(UF, "AC");
        let features = aligner.align(&record).unwrap();

        assert_eq!(value_of(&aligner, &features, "UF_SP"), 0.0);
        assert_eq!(value_of(&aligner, &features, "UF_RJ"), 0.0);
        assert_eq!(features[4..].iter().sum::<f64>(), 8.0);
        assert_eq!(aligner.unknown_categories(&record), vec![UF.to_string()]);
    }

    #[test]
    fn test_missing_fields_are_imputed_or_zero() {
        let aligner = aligner();
        let record = RawRecord::new().with(UF, "RJ");
        let features = aligner.align(&record).unwrap();

        // median fill for the minimum course load, zero for the rest
        assert_eq!(&features[..4], &[0.0, 1000.0, 0.0, 0.0]);
        assert_eq!(value_of(&aligner, &features, "Fator Esforço Curso_1"), 1.0);
        assert_eq!(
            value_of(
                &aligner,
                &features,
                "Eixo Tecnológico_Desenvolvimento Educacional e Social"
            ),
            1.0
        );
        // no constant for Sexo, block stays empty
        assert_eq!(value_of(&aligner, &features, "Sexo_Feminino"), 0.0);
        assert_eq!(value_of(&aligner, &features, "Sexo_Masculino"), 0.0);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let aligner = aligner();
        let with_extra = full_record()
            .with("Código da Matricula", 123456)
            .with("Região", "Sudeste");
        assert_eq!(
            aligner.align(&with_extra).unwrap(),
            aligner.align(&full_record()).unwrap()
        );
    }

    #[test]
    fn test_numeric_text_is_parsed() {
        let aligner = aligner();
        let record = full_record().with(CARGA_HORARIA_MINIMA, "800,5");
        let features = aligner.align(&record).unwrap();
        assert_eq!(features[1], 800.5);
    }

    #[test]
    fn test_malformed_numeric_is_an_error() {
        let aligner = aligner();
        let record = full_record().with(CARGA_HORARIA, "mil");
        let err = aligner.align(&record).unwrap_err();
        assert!(matches!(err, EvasionError::InvalidField { .. }));
    }
}
