//! Artifact lifecycle and the inference context
//!
//! The classifier and the encoder are trained once, persisted, and from
//! then on only loaded. [`InferenceContext`] owns both plus the derived
//! expected feature list; it is immutable after construction and can be
//! shared across threads.

use crate::alignment::FeatureAligner;
use crate::classifier::{Classifier, RiskLevel};
use crate::encoder::OneHotEncoder;
use crate::errors::{ArtifactKind, EvasionError, Result};
use crate::forest::RandomForest;
use crate::imputation::ImputationProfile;
use crate::record::RawRecord;
use crate::serialization::hash_hex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Default classifier artifact file name
pub const DEFAULT_MODEL_FILE: &str = "modelo_evasao.json";

/// Default encoder artifact file name
pub const DEFAULT_ENCODER_FILE: &str = "onehot_encoder.json";

/// Extension of the BLAKE3 sidecar written next to each artifact
pub const HASH_EXTENSION: &str = "hash";

/// Where the two artifacts live on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoder: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_FILE),
            encoder: PathBuf::from(DEFAULT_ENCODER_FILE),
        }
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            model: dir.as_ref().join(DEFAULT_MODEL_FILE),
            encoder: dir.as_ref().join(DEFAULT_ENCODER_FILE),
        }
    }

    /// Report the first missing artifact, classifier first.
    pub fn check_exist(&self) -> Result<()> {
        if !self.model.exists() {
            return Err(EvasionError::MissingArtifact {
                kind: ArtifactKind::Classifier,
                path: self.model.clone(),
            });
        }
        if !self.encoder.exists() {
            return Err(EvasionError::MissingArtifact {
                kind: ArtifactKind::Encoder,
                path: self.encoder.clone(),
            });
        }
        Ok(())
    }
}

/// Path of the hash sidecar for an artifact (`model.json` -> `model.json.hash`)
pub fn hash_sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(HASH_EXTENSION);
    PathBuf::from(name)
}

/// Write canonical JSON plus its BLAKE3 sidecar; returns the hex digest.
pub fn write_artifact(path: &Path, canonical_json: &str) -> Result<String> {
    fs::write(path, canonical_json)?;
    let digest = hash_hex(canonical_json.as_bytes());
    fs::write(hash_sidecar_path(path), &digest)?;
    Ok(digest)
}

/// Read an artifact, checking it against its sidecar when one exists.
fn read_verified(kind: ArtifactKind, path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    let sidecar = hash_sidecar_path(path);

    if sidecar.exists() {
        let expected = fs::read_to_string(&sidecar)?.trim().to_lowercase();
        let computed = hash_hex(content.as_bytes());
        if expected != computed {
            return Err(EvasionError::IntegrityMismatch {
                kind,
                expected,
                computed,
            });
        }
    } else {
        warn!("No hash sidecar for {} artifact at {}", kind, path.display());
    }

    Ok(content)
}

/// Loaded classifier, encoder and expected feature list
#[derive(Debug)]
pub struct InferenceContext {
    classifier: Box<dyn Classifier>,
    aligner: FeatureAligner,
}

impl InferenceContext {
    /// Assemble a context from already-built parts.
    ///
    /// Fails when the classifier's width (or recorded feature names) does
    /// not match the list derived from the encoder.
    pub fn from_parts(
        classifier: Box<dyn Classifier>,
        encoder: OneHotEncoder,
        imputation: ImputationProfile,
    ) -> Result<Self> {
        let aligner = FeatureAligner::new(encoder, imputation);
        let expected = aligner.expected_features();

        if classifier.n_features() != expected.len() {
            return Err(EvasionError::FeatureMismatch(format!(
                "classifier expects {} features, encoder yields {}",
                classifier.n_features(),
                expected.len()
            )));
        }

        if let Some(names) = classifier.feature_names() {
            if let Some(pos) = names.iter().zip(expected).position(|(a, b)| a != b) {
                return Err(EvasionError::FeatureMismatch(format!(
                    "feature {} is {:?} in the classifier but {:?} from the encoder",
                    pos, names[pos], expected[pos]
                )));
            }
        }

        Ok(Self {
            classifier,
            aligner,
        })
    }

    /// Load both artifacts from disk.
    ///
    /// Both files must exist before either is read; a missing file is
    /// reported as [`EvasionError::MissingArtifact`].
    #[instrument(skip(paths), fields(model = %paths.model.display(), encoder = %paths.encoder.display()))]
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        if let Err(err) = paths.check_exist() {
            error!("{}", err);
            return Err(err);
        }

        let forest = RandomForest::from_json(&read_verified(ArtifactKind::Classifier, &paths.model)?)?;
        let encoder = OneHotEncoder::from_json(&read_verified(ArtifactKind::Encoder, &paths.encoder)?)?;

        let context = Self::from_parts(Box::new(forest), encoder, ImputationProfile::frozen())?;

        info!("Classifier loaded from {}", paths.model.display());
        info!("Encoder loaded from {}", paths.encoder.display());
        info!(
            "Total features expected by the classifier: {}",
            context.expected_features().len()
        );

        Ok(context)
    }

    pub fn expected_features(&self) -> &[String] {
        self.aligner.expected_features()
    }

    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Aligned feature vector for one record
    pub fn align(&self, record: &RawRecord) -> Result<Vec<f64>> {
        self.aligner.align(record)
    }

    /// Align and classify one record
    pub fn predict(&self, record: &RawRecord) -> Result<RiskLevel> {
        let features = self.align(record)?;
        self.classifier.predict(&features)
    }
}
