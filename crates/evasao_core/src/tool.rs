//! Agent tool wrapper around the prediction entry point
//!
//! Exposes the 13 profile fields as a declarative, JSON-schema-like
//! description so an orchestrator can discover and call `predict_evasion`.

use crate::agent::EvasionAgent;
use crate::record::StudentProfile;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Name under which the tool is registered
pub const TOOL_NAME: &str = "predict_evasion";

/// One-line tool description
pub const TOOL_DESCRIPTION: &str =
    "Prevê se um aluno tem alto ou baixo risco de evasão baseado em suas informações.";

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Integer,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
}

/// Parameter schemas keyed by name, serialized as a JSON object in
/// declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<(String, ParameterSchema)>);

impl Properties {
    pub fn get(&self, name: &str) -> Option<&ParameterSchema> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, schema)| schema)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl FromIterator<(String, ParameterSchema)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, ParameterSchema)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Properties, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, ParameterSchema>()? {
                    entries.push(entry);
                }
                Ok(Properties(entries))
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Properties,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

/// Parameter name, JSON type and description, in declaration order
const PARAMETERS: [(&str, ParameterType, &str); 13] = [
    (
        "Carga_Horaria",
        ParameterType::Integer,
        "Carga Horaria total do curso (por exemplo, 1000).",
    ),
    (
        "Carga_Horaria_Mínima",
        ParameterType::Number,
        "Carga Horaria Mínima exigida pelo curso (por exemplo, 800.0).",
    ),
    (
        "Fator_Esforço_Curso",
        ParameterType::String,
        "Fator de Esforço do Curso (por exemplo, '1', '2', '3').",
    ),
    (
        "Fonte_de_Financiamento",
        ParameterType::String,
        "Fonte de Financiamento do aluno (por exemplo, 'Público', 'Privado').",
    ),
    (
        "Modalidade_de_Ensino",
        ParameterType::String,
        "Modalidade de Ensino (por exemplo, 'Presencial', 'EAD').",
    ),
    (
        "Sexo",
        ParameterType::String,
        "Sexo do aluno (por exemplo, 'Feminino', 'Masculino').",
    ),
    (
        "Tipo_de_Curso",
        ParameterType::String,
        "Tipo de Curso (por exemplo, 'Técnico', 'FIC').",
    ),
    (
        "Tipo_de_Oferta",
        ParameterType::String,
        "Tipo de Oferta (por exemplo, 'Regular', 'PROEJA - Integrado').",
    ),
    (
        "UF",
        ParameterType::String,
        "Unidade Federativa do curso (por exemplo, 'SP', 'MG').",
    ),
    (
        "Eixo_Tecnológico",
        ParameterType::String,
        "Eixo Tecnológico do curso (por exemplo, 'Gestão e Negócios').",
    ),
    (
        "Subeixo_Tecnológico",
        ParameterType::String,
        "Subeixo Tecnológico do curso (por exemplo, 'Comércio').",
    ),
    (
        "Número_de_registros",
        ParameterType::Integer,
        "Número de registros do aluno (por exemplo, 1, 5).",
    ),
    (
        "Código_da_Unidade_de_Ensino_SISTEC",
        ParameterType::Integer,
        "Código da Unidade de Ensino - SISTEC (por exemplo, 12345).",
    ),
];

/// Tool facade over an [`EvasionAgent`]
#[derive(Debug)]
pub struct EvasionPredictionTool {
    agent: EvasionAgent,
}

impl EvasionPredictionTool {
    pub fn new(agent: EvasionAgent) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &EvasionAgent {
        &self.agent
    }

    /// Declarative description of the tool and its parameters
    pub fn schema() -> ToolSchema {
        let properties = PARAMETERS
            .iter()
            .map(|(name, kind, description)| {
                (
                    name.to_string(),
                    ParameterSchema {
                        kind: *kind,
                        description: description.to_string(),
                    },
                )
            })
            .collect();

        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            parameters: ParametersSchema {
                kind: "object".to_string(),
                properties,
                required: PARAMETERS.iter().map(|(name, _, _)| name.to_string()).collect(),
            },
        }
    }

    /// Run the tool on a JSON arguments object.
    pub fn call(&self, arguments: Value) -> String {
        match serde_json::from_value::<StudentProfile>(arguments) {
            Ok(profile) => self.predict_evasion(&profile),
            Err(err) => {
                warn!("Rejected tool arguments: {}", err);
                format!("Argumentos inválidos para {TOOL_NAME}: {err}")
            }
        }
    }

    pub fn predict_evasion(&self, profile: &StudentProfile) -> String {
        self.agent.predict_evasion_status(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactPaths;
    use crate::agent::INTERNAL_ERROR_MESSAGE;
    use serde_json::json;

    #[test]
    fn test_schema_shape() {
        let schema = EvasionPredictionTool::schema();
        assert_eq!(schema.name, "predict_evasion");
        assert_eq!(schema.parameters.kind, "object");
        assert_eq!(schema.parameters.properties.len(), 13);
        assert_eq!(schema.parameters.required.len(), 13);
        assert_eq!(schema.parameters.required[0], "Carga_Horaria");
        let kind = |name: &str| schema.parameters.properties.get(name).unwrap().kind;
        assert_eq!(kind("Carga_Horaria_Mínima"), ParameterType::Number);
        assert_eq!(kind("Código_da_Unidade_de_Ensino_SISTEC"), ParameterType::Integer);
        assert_eq!(kind("UF"), ParameterType::String);
        assert!(schema.parameters.properties.get("Nome").is_none());
    }

    #[test]
    fn test_schema_json() {
        let value = serde_json::to_value(EvasionPredictionTool::schema()).unwrap();
        assert_eq!(value["parameters"]["type"], "object");
        assert_eq!(value["parameters"]["properties"]["Sexo"]["type"], "string");
        assert_eq!(value["parameters"]["properties"]["Carga_Horaria"]["type"], "integer");
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema = EvasionPredictionTool::schema();
        let names: Vec<&str> = schema.parameters.properties.names().collect();
        assert_eq!(names, schema.parameters.required);

        // the serialized object lists parameters in the same order
        let json = serde_json::to_string(&schema).unwrap();
        let positions: Vec<usize> = schema
            .parameters
            .required
            .iter()
            .map(|name| json.find(&format!("\"{name}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let parsed: ToolSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn test_required_matches_profile_fields() {
        // every required parameter must be accepted by the profile
        let schema = EvasionPredictionTool::schema();
        let mut arguments = serde_json::Map::new();
        for name in &schema.parameters.required {
            let value = match schema.parameters.properties.get(name).unwrap().kind {
                ParameterType::Integer => json!(1),
                ParameterType::Number => json!(1.5),
                ParameterType::String => json!("x"),
            };
            arguments.insert(name.clone(), value);
        }
        assert!(serde_json::from_value::<StudentProfile>(Value::Object(arguments)).is_ok());
    }

    #[test]
    fn test_malformed_arguments() {
        let tool = EvasionPredictionTool::new(EvasionAgent::new(ArtifactPaths::default()));
        let result = tool.call(json!({"UF": "SP"}));
        assert!(result.starts_with("Argumentos inválidos"));
        assert!(!tool.agent().is_loaded());
    }

    #[test]
    fn test_call_without_artifacts() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = EvasionPredictionTool::new(EvasionAgent::new(ArtifactPaths::in_dir(dir.path())));
        let result = tool.call(json!({
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
        }));
        assert_eq!(result, INTERNAL_ERROR_MESSAGE);
    }
}
