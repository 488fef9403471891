//! Prediction entry point
//!
//! [`EvasionAgent`] holds the artifact locations and, once loaded, the
//! [`InferenceContext`]. Loading is explicit and idempotent: the first
//! successful load is kept for the lifetime of the agent, a failed load
//! leaves the agent unloaded so a later call can retry.

use crate::artifacts::{ArtifactPaths, InferenceContext};
use crate::errors::{EvasionError, Result};
use crate::record::{RawRecord, StudentProfile};
use once_cell::sync::OnceCell;
use tracing::{debug, error};

/// Returned by [`EvasionAgent::predict_evasion_status`] when the artifacts
/// cannot be loaded
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno: Modelo ou Encoder não pôde ser carregado.";

/// Dropout risk predictor backed by persisted artifacts
#[derive(Debug)]
pub struct EvasionAgent {
    paths: ArtifactPaths,
    context: OnceCell<InferenceContext>,
}

impl Default for EvasionAgent {
    fn default() -> Self {
        Self::new(ArtifactPaths::default())
    }
}

impl EvasionAgent {
    /// Agent that will load from `paths` on first use
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            context: OnceCell::new(),
        }
    }

    /// Agent around an already-built context
    pub fn with_context(paths: ArtifactPaths, context: InferenceContext) -> Self {
        Self {
            paths,
            context: OnceCell::with_value(context),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.context.get().is_some()
    }

    /// Load both artifacts unless already loaded.
    pub fn load(&self) -> Result<&InferenceContext> {
        self.context
            .get_or_try_init(|| InferenceContext::load(&self.paths))
    }

    /// Loaded context, without attempting a load
    pub fn context(&self) -> Result<&InferenceContext> {
        self.context.get().ok_or(EvasionError::NotInitialized)
    }

    /// Aligned feature vector for one record.
    ///
    /// Never loads; fails with [`EvasionError::NotInitialized`] when
    /// [`load`](Self::load) has not succeeded yet.
    pub fn align_features(&self, record: &RawRecord) -> Result<Vec<f64>> {
        self.context()?.align(record)
    }

    /// Classify a profile and return one of the two fixed messages.
    ///
    /// Loads the artifacts on first use. Load failures come back as
    /// [`INTERNAL_ERROR_MESSAGE`] instead of an error.
    pub fn predict_evasion_status(&self, profile: &StudentProfile) -> String {
        let context = match self.load() {
            Ok(context) => context,
            Err(err) => {
                error!("Failed to load artifacts: {}", err);
                return INTERNAL_ERROR_MESSAGE.to_string();
            }
        };

        match context.predict(&profile.to_record()) {
            Ok(risk) => {
                debug!(class = risk.class(), "prediction");
                risk.message().to_string()
            }
            Err(err) => {
                error!("Prediction failed: {}", err);
                format!("Erro interno: {err}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::write_artifact;
    use crate::encoder::OneHotEncoder;
    use crate::forest::{Node, RandomForest, Tree};
    use crate::imputation::ImputationProfile;
    use crate::schema::SEXO;
    use tempfile::TempDir;

    fn create_test_encoder() -> OneHotEncoder {
        OneHotEncoder::fit(
            &[SEXO],
            &[
                vec![Some("Feminino".to_string())],
                vec![Some("Masculino".to_string())],
            ],
        )
        .unwrap()
    }

    // high risk for "Sexo_Feminino" (index 4)
    fn create_test_forest() -> RandomForest {
        RandomForest::new(
            6,
            vec![Tree::new(vec![
                Node::internal(0, 4, 0.5, 1, 2),
                Node::leaf(1, 0.2),
                Node::leaf(2, 0.7),
            ])],
        )
    }

    fn profile(sexo: &str) -> StudentProfile {
        StudentProfile {
            carga_horaria: 1000,
            carga_horaria_minima: 800.0,
            fator_esforco_curso: "1".to_string(),
            fonte_de_financiamento: "Público".to_string(),
            modalidade_de_ensino: "Presencial".to_string(),
            sexo: sexo.to_string(),
            tipo_de_curso: "Técnico".to_string(),
            tipo_de_oferta: "Regular".to_string(),
            uf: "SP".to_string(),
            eixo_tecnologico: "Gestão e Negócios".to_string(),
            subeixo_tecnologico: "Comércio".to_string(),
            numero_de_registros: 5,
            codigo_unidade_sistec: 26437,
        }
    }

    fn write_fixture(dir: &TempDir) -> ArtifactPaths {
        let paths = ArtifactPaths::in_dir(dir.path());
        write_artifact(&paths.model, &create_test_forest().to_canonical_json().unwrap()).unwrap();
        write_artifact(&paths.encoder, &create_test_encoder().to_canonical_json().unwrap()).unwrap();
        paths
    }

    #[test]
    fn test_align_before_load_fails_fast() {
        let dir = TempDir::new().unwrap();
        let agent = EvasionAgent::new(write_fixture(&dir));

        let err = agent.align_features(&profile("Feminino").to_record()).unwrap_err();
        assert!(matches!(err, EvasionError::NotInitialized));
        assert!(!agent.is_loaded());
    }

    #[test]
    fn test_lazy_load_and_predict() {
        let dir = TempDir::new().unwrap();
        let agent = EvasionAgent::new(write_fixture(&dir));

        assert_eq!(agent.predict_evasion_status(&profile("Feminino")), "Alto risco de evasão.");
        assert!(agent.is_loaded());
        assert_eq!(agent.predict_evasion_status(&profile("Masculino")), "Baixo risco de evasão.");
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let agent = EvasionAgent::new(write_fixture(&dir));

        let first = agent.load().unwrap() as *const InferenceContext;
        // artifacts gone, the cached context is still used
        std::fs::remove_file(&agent.paths().model).unwrap();
        let second = agent.load().unwrap() as *const InferenceContext;
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_artifacts_give_sentinel() {
        let dir = TempDir::new().unwrap();
        let agent = EvasionAgent::new(ArtifactPaths::in_dir(dir.path()));

        assert!(agent.load().is_err());
        assert_eq!(agent.predict_evasion_status(&profile("Feminino")), INTERNAL_ERROR_MESSAGE);
        assert!(!agent.is_loaded());
    }

    #[test]
    fn test_with_context() {
        let context = InferenceContext::from_parts(
            Box::new(create_test_forest()),
            create_test_encoder(),
            ImputationProfile::frozen(),
        )
        .unwrap();
        let agent = EvasionAgent::with_context(ArtifactPaths::default(), context);

        assert!(agent.is_loaded());
        let features = agent.align_features(&profile("Feminino").to_record()).unwrap();
        assert_eq!(features, vec![1000.0, 800.0, 5.0, 26437.0, 1.0, 0.0]);
    }
}
