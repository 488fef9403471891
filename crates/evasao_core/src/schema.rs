//! Fixed dataset schema shared by training and inference
//!
//! Column names are the repaired (post-[`normalize_text`]) names of the
//! SISTEC academic-efficiency microdata.
//!
//! [`normalize_text`]: crate::text::normalize_text

use crate::text::normalize_text;

pub const CARGA_HORARIA: &str = "Carga Horaria";
pub const CARGA_HORARIA_MINIMA: &str = "Carga Horaria Mínima";
pub const FATOR_ESFORCO_CURSO: &str = "Fator Esforço Curso";
pub const FONTE_FINANCIAMENTO: &str = "Fonte de Financiamento";
pub const MODALIDADE_ENSINO: &str = "Modalidade de Ensino";
pub const SEXO: &str = "Sexo";
pub const TIPO_CURSO: &str = "Tipo de Curso";
pub const TIPO_OFERTA: &str = "Tipo de Oferta";
pub const UF: &str = "UF";
pub const EIXO_TECNOLOGICO: &str = "Eixo Tecnológico";
pub const SUBEIXO_TECNOLOGICO: &str = "Subeixo Tecnológico";
pub const NUMERO_REGISTROS: &str = "Número de registros";
pub const CODIGO_UNIDADE_SISTEC: &str = "Código da Unidade de Ensino - SISTEC";

/// Raw status column holding the enrollment outcome
pub const STATUS_COLUMN: &str = "Categoria da Situação";

/// Status value (after repair) that maps to the positive class
pub const DROPOUT_STATUS: &str = "Evasão";

/// The 13 raw fields a prediction request carries, in table order.
pub const RAW_INPUT_FIELDS: [&str; 13] = [
    CARGA_HORARIA,
    CARGA_HORARIA_MINIMA,
    FATOR_ESFORCO_CURSO,
    FONTE_FINANCIAMENTO,
    MODALIDADE_ENSINO,
    SEXO,
    TIPO_CURSO,
    TIPO_OFERTA,
    UF,
    EIXO_TECNOLOGICO,
    SUBEIXO_TECNOLOGICO,
    NUMERO_REGISTROS,
    CODIGO_UNIDADE_SISTEC,
];

/// Numeric passthrough features; these open the expected feature list.
pub const NUMERIC_FEATURES: [&str; 4] = [
    CARGA_HORARIA,
    CARGA_HORARIA_MINIMA,
    NUMERO_REGISTROS,
    CODIGO_UNIDADE_SISTEC,
];

/// Columns one-hot encoded by the encoder, in encoder order.
pub const CATEGORICAL_FEATURES: [&str; 9] = [
    FATOR_ESFORCO_CURSO,
    FONTE_FINANCIAMENTO,
    MODALIDADE_ENSINO,
    SEXO,
    TIPO_CURSO,
    TIPO_OFERTA,
    UF,
    EIXO_TECNOLOGICO,
    SUBEIXO_TECNOLOGICO,
];

/// Identifier, date and high-cardinality columns never used as features.
pub const DISCARDED_COLUMNS: [&str; 15] = [
    "Código da Matricula",
    "Co Inst",
    "Cod Unidade",
    "Código do Ciclo Matricula",
    "Código do Município com DV",
    "Data de Fim Previsto do Ciclo",
    "Data de Inicio do Ciclo",
    "Data de Ocorrencia da Matricula",
    "Mês De Ocorrência da Situação",
    "Instituição",
    "Nome de Curso",
    "Unidade de Ensino",
    "Município",
    "Região",
    "Situação de Matrícula",
];

/// Binary label for a status value.
///
/// Only the exact repaired string `"Evasão"` is a dropout; every other
/// status, including unseen or malformed ones, is the negative class.
pub fn derive_label(status: &str) -> u8 {
    if normalize_text(status) == DROPOUT_STATUS {
        1
    } else {
        0
    }
}

pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&column)
}

pub fn is_numeric(column: &str) -> bool {
    NUMERIC_FEATURES.contains(&column)
}
