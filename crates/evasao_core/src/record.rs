//! Raw prediction inputs
//!
//! A [`RawRecord`] is what an external caller hands over: field name to
//! scalar, in whatever key order. [`StudentProfile`] is the typed form of
//! the same 13 fields, named the way the agent tool exposes them.

use crate::schema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar value of a single raw field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// NaN floats count as absent, like an empty cell.
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Float(v) if v.is_nan())
    }

    /// Numeric view; text is parsed accepting a decimal comma.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Int(v) => Some(*v as f64),
            RawValue::Float(v) if v.is_nan() => None,
            RawValue::Float(v) => Some(*v),
            RawValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        }
    }

    /// String view used as a category before cleaning.
    pub fn as_category(&self) -> String {
        match self {
            RawValue::Int(v) => v.to_string(),
            RawValue::Float(v) => format!("{v:?}"),
            RawValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(value.into())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Unordered mapping from dataset column name to raw value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Present, non-missing value for a field
    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field).filter(|v| !v.is_missing())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// The 13 typed fields of a prediction request, named as the tool exposes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(rename = "Carga_Horaria")]
    pub carga_horaria: i64,
    #[serde(rename = "Carga_Horaria_Mínima")]
    pub carga_horaria_minima: f64,
    #[serde(rename = "Fator_Esforço_Curso")]
    pub fator_esforco_curso: String,
    #[serde(rename = "Fonte_de_Financiamento")]
    pub fonte_de_financiamento: String,
    #[serde(rename = "Modalidade_de_Ensino")]
    pub modalidade_de_ensino: String,
    #[serde(rename = "Sexo")]
    pub sexo: String,
    #[serde(rename = "Tipo_de_Curso")]
    pub tipo_de_curso: String,
    #[serde(rename = "Tipo_de_Oferta")]
    pub tipo_de_oferta: String,
    #[serde(rename = "UF")]
    pub uf: String,
    #[serde(rename = "Eixo_Tecnológico")]
    pub eixo_tecnologico: String,
    #[serde(rename = "Subeixo_Tecnológico")]
    pub subeixo_tecnologico: String,
    #[serde(rename = "Número_de_registros")]
    pub numero_de_registros: i64,
    #[serde(rename = "Código_da_Unidade_de_Ensino_SISTEC")]
    pub codigo_unidade_sistec: i64,
}

impl StudentProfile {
    /// Re-key the profile by dataset column names.
    pub fn to_record(&self) -> RawRecord {
        RawRecord::new()
            .with(schema::CARGA_HORARIA, self.carga_horaria)
            .with(schema::CARGA_HORARIA_MINIMA, self.carga_horaria_minima)
            .with(schema::FATOR_ESFORCO_CURSO, self.fator_esforco_curso.as_str())
            .with(schema::FONTE_FINANCIAMENTO, self.fonte_de_financiamento.as_str())
            .with(schema::MODALIDADE_ENSINO, self.modalidade_de_ensino.as_str())
            .with(schema::SEXO, self.sexo.as_str())
            .with(schema::TIPO_CURSO, self.tipo_de_curso.as_str())
            .with(schema::TIPO_OFERTA, self.tipo_de_oferta.as_str())
            .with(schema::UF, self.uf.as_str())
            .with(schema::EIXO_TECNOLOGICO, self.eixo_tecnologico.as_str())
            .with(schema::SUBEIXO_TECNOLOGICO, self.subeixo_tecnologico.as_str())
            .with(schema::NUMERO_REGISTROS, self.numero_de_registros)
            .with(schema::CODIGO_UNIDADE_SISTEC, self.codigo_unidade_sistec)
    }
}

impl From<&StudentProfile> for RawRecord {
    fn from(profile: &StudentProfile) -> Self {
        profile.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(RawValue::Int(5).as_f64(), Some(5.0));
        assert_eq!(RawValue::Float(800.5).as_f64(), Some(800.5));
        assert_eq!(RawValue::from("1,5").as_f64(), Some(1.5));
        assert_eq!(RawValue::from("abc").as_f64(), None);
        assert_eq!(RawValue::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_category_views() {
        assert_eq!(RawValue::Int(1).as_category(), "1");
        assert_eq!(RawValue::Float(1.0).as_category(), "1.0");
        assert_eq!(RawValue::from("SP").as_category(), "SP");
    }

    #[test]
    fn test_nan_is_treated_as_absent() {
        let record = RawRecord::new().with(schema::CARGA_HORARIA_MINIMA, f64::NAN);
        assert_eq!(record.len(), 1);
        assert!(record.get(schema::CARGA_HORARIA_MINIMA).is_none());
    }

    #[test]
    fn test_profile_deserializes_from_tool_arguments() {
        let json = r#"{
            "Carga_Horaria": 1000,
            "Carga_Horaria_Mínima": 800.0,
            "Fator_Esforço_Curso": "1",
            "Fonte_de_Financiamento": "Público",
            "Modalidade_de_Ensino": "Presencial",
            "Sexo": "Feminino",
            "Tipo_de_Curso": "Técnico",
            "Tipo_de_Oferta": "Regular",
            "UF": "SP",
            "Eixo_Tecnológico": "Gestão e Negócios",
            "Subeixo_Tecnológico": "Comércio",
            "Número_de_registros": 5,
            "Código_da_Unidade_de_Ensino_SISTEC": 26437
        }"#;

        let profile: StudentProfile = serde_json::from_str(json).unwrap();
        let record = profile.to_record();

        assert_eq!(record.len(), schema::RAW_INPUT_FIELDS.len());
        assert_eq!(record.get(schema::CARGA_HORARIA), Some(&RawValue::Int(1000)));
        assert_eq!(record.get(schema::UF), Some(&RawValue::from("SP")));
        assert_eq!(
            record.get(schema::CODIGO_UNIDADE_SISTEC),
            Some(&RawValue::Int(26437))
        );
    }

    #[test]
    fn test_raw_record_from_json_object() {
        let record: RawRecord =
            serde_json::from_str(r#"{"UF": "RJ", "Carga Horaria": 500, "Carga Horaria Mínima": 1000.5}"#)
                .unwrap();
        assert_eq!(record.get("UF"), Some(&RawValue::from("RJ")));
        assert_eq!(record.get("Carga Horaria"), Some(&RawValue::Int(500)));
        assert_eq!(record.get("Carga Horaria Mínima"), Some(&RawValue::Float(1000.5)));
    }
}
