//! Artifact Loading - Normalizer, Encoder, Classifier
//!
//! Load cả ba artifact một lần khi khởi động; lỗi ở bất kỳ artifact nào
//! là lỗi toàn bộ (không phục vụ nửa vời).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::{self, LogisticRegression, ProbabilisticClassifier};
use super::encoder::{self, OneHotEncoder};
use super::onnx::OnnxClassifier;
use super::scaler::{self, StandardScaler};
use crate::constants;
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::assembler::FeatureAssembler;
use crate::logic::features::layout::FeatureSchema;

// ============================================================================
// CONFIG
// ============================================================================

/// Where to find the trained artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub artifact_dir: PathBuf,
    pub scaler_file: String,
    pub encoder_file: String,
    /// `.onnx` → ONNX Runtime, `.json` → logistic regression weights
    pub model_file: String,
    /// Lowercase hex SHA-256 the classifier file must match
    pub expected_model_sha256: Option<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(constants::DEFAULT_ARTIFACT_DIR),
            scaler_file: constants::DEFAULT_SCALER_FILE.to_string(),
            encoder_file: constants::DEFAULT_ENCODER_FILE.to_string(),
            model_file: constants::DEFAULT_MODEL_FILE.to_string(),
            expected_model_sha256: None,
        }
    }
}

impl ArtifactConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            artifact_dir: PathBuf::from(constants::get_artifact_dir()),
            scaler_file: constants::get_scaler_file(),
            encoder_file: constants::get_encoder_file(),
            model_file: constants::get_model_file(),
            expected_model_sha256: constants::get_model_sha256(),
        }
    }

    /// All artifacts from one directory, default file names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.scaler_file)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.encoder_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.model_file)
    }
}

// ============================================================================
// ARTIFACT INFO
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub sha256: String,
}

/// What was loaded, for status endpoints and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub scaler: ArtifactFile,
    pub encoder: ArtifactFile,
    pub model: ArtifactFile,
    pub backend: String,
    pub schema: FeatureSchema,
    pub layout_hash: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// ARTIFACT SET
// ============================================================================

/// The three loaded artifacts, read-only from here on.
///
/// The classifier is not yet checked against `assembler.schema()`; that
/// happens when the set is composed into an `InferencePipeline`.
pub struct ArtifactSet {
    pub assembler: FeatureAssembler,
    pub classifier: Arc<dyn ProbabilisticClassifier>,
    pub info: ArtifactInfo,
}

impl ArtifactSet {
    pub fn load(config: &ArtifactConfig) -> PipelineResult<Self> {
        log::info!("Loading artifacts from: {}", config.artifact_dir.display());

        let (scaler_bytes, scaler_file) = read_artifact(scaler::ARTIFACT_NAME, &config.scaler_path())?;
        let scaler = StandardScaler::from_json(&utf8(scaler::ARTIFACT_NAME, &scaler_bytes)?)?;

        let (encoder_bytes, encoder_file) = read_artifact(encoder::ARTIFACT_NAME, &config.encoder_path())?;
        let encoder = OneHotEncoder::from_json(&utf8(encoder::ARTIFACT_NAME, &encoder_bytes)?)?;

        let model_path = config.model_path();
        let (model_bytes, model_file) = read_artifact(classifier::ARTIFACT_NAME, &model_path)?;

        if let Some(expected) = &config.expected_model_sha256 {
            if *expected != model_file.sha256 {
                return Err(PipelineError::artifact(
                    classifier::ARTIFACT_NAME,
                    format!("checksum mismatch: expected {}, got {}", expected, model_file.sha256),
                ));
            }
        }

        let classifier: Arc<dyn ProbabilisticClassifier> = match extension(&model_path).as_deref() {
            Some("json") => Arc::new(LogisticRegression::from_json(&utf8(
                classifier::ARTIFACT_NAME,
                &model_bytes,
            )?)?),
            Some("onnx") => {
                let mut onnx = OnnxClassifier::load_from_bytes(&model_bytes)?;
                if let Some(names) = load_sidecar_columns(&model_path)? {
                    onnx = onnx.with_feature_names(names);
                }
                Arc::new(onnx)
            }
            other => {
                return Err(PipelineError::artifact(
                    classifier::ARTIFACT_NAME,
                    format!("unsupported model format: {:?}", other),
                ))
            }
        };

        let assembler = FeatureAssembler::new(Arc::new(scaler), Arc::new(encoder))?;
        let schema = assembler.schema().clone();

        let info = ArtifactInfo {
            scaler: scaler_file,
            encoder: encoder_file,
            model: model_file,
            backend: classifier.backend().to_string(),
            layout_hash: format!("{:08x}", schema.layout_hash()),
            schema,
            loaded_at: chrono::Utc::now(),
        };

        log::info!(
            "Artifacts loaded: backend={}, columns={}, layout={}, model sha256={}",
            info.backend,
            info.schema.len(),
            info.layout_hash,
            info.model.sha256
        );

        Ok(Self {
            assembler,
            classifier,
            info,
        })
    }
}

fn read_artifact(artifact: &str, path: &Path) -> PipelineResult<(Vec<u8>, ArtifactFile)> {
    let bytes = std::fs::read(path).map_err(|e| {
        PipelineError::artifact(artifact, format!("cannot read {}: {}", path.display(), e))
    })?;

    let file = ArtifactFile {
        path: path.display().to_string(),
        sha256: sha256_hex(&bytes),
    };
    log::debug!("Read {} ({} bytes, sha256 {})", file.path, bytes.len(), file.sha256);

    Ok((bytes, file))
}

fn utf8(artifact: &str, bytes: &[u8]) -> PipelineResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| PipelineError::artifact(artifact, format!("not UTF-8: {}", e)))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// `model.onnx` → optional `model.features.json` listing training columns
fn load_sidecar_columns(model_path: &Path) -> PipelineResult<Option<Vec<String>>> {
    let sidecar = model_path.with_extension("features.json");
    if !sidecar.exists() {
        log::warn!(
            "No column list next to {}; only the classifier input width can be verified",
            model_path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(&sidecar).map_err(|e| {
        PipelineError::artifact(classifier::ARTIFACT_NAME, format!("cannot read {}: {}", sidecar.display(), e))
    })?;
    let names: Vec<String> = serde_json::from_str(&content).map_err(|e| {
        PipelineError::artifact(classifier::ARTIFACT_NAME, format!("bad column list: {}", e))
    })?;

    Ok(Some(names))
}

/// Lowercase hex SHA-256
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::pipeline::InferencePipeline;
    use std::fs;
    use tempfile::tempdir;

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

    fn fixture_config() -> ArtifactConfig {
        ArtifactConfig {
            model_file: "model.json".to_string(),
            ..ArtifactConfig::in_dir(FIXTURES)
        }
    }

    fn copy_fixtures(dir: &Path) {
        for name in ["scaler.json", "encoder.json", "model.json"] {
            fs::copy(Path::new(FIXTURES).join(name), dir.join(name)).unwrap();
        }
    }

    #[test]
    fn test_load_fixture_set() {
        let set = ArtifactSet::load(&fixture_config()).unwrap();

        assert_eq!(set.info.backend, "logistic-regression");
        assert_eq!(set.info.schema.len(), 14);
        assert_eq!(set.info.model.sha256.len(), 64);
        assert_eq!(set.info.layout_hash.len(), 8);
    }

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = ArtifactSet::load(&ArtifactConfig::in_dir(dir.path())).err().unwrap();
        assert!(matches!(
            err,
            PipelineError::ArtifactUnavailable { ref artifact, .. } if artifact == "numeric_normalizer"
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let config = ArtifactConfig {
            expected_model_sha256: Some("00".repeat(32)),
            ..fixture_config()
        };
        let err = ArtifactSet::load(&config).err().unwrap();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_checksum_match() {
        let bytes = fs::read(Path::new(FIXTURES).join("model.json")).unwrap();
        let config = ArtifactConfig {
            expected_model_sha256: Some(sha256_hex(&bytes)),
            ..fixture_config()
        };
        assert!(ArtifactSet::load(&config).is_ok());
    }

    #[test]
    fn test_classifier_column_mismatch_rejected() {
        let dir = tempdir().unwrap();
        copy_fixtures(dir.path());

        // Swap two indicator columns in the model's declared order
        let path = dir.path().join("model.json");
        let mut model: LogisticRegression =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        model.feature_names.swap(4, 5);
        fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();

        let config = ArtifactConfig {
            model_file: "model.json".to_string(),
            ..ArtifactConfig::in_dir(dir.path())
        };
        assert!(ArtifactSet::load(&config).is_ok());

        let err = InferencePipeline::load(&config).err().unwrap();
        assert!(err.to_string().contains("column order mismatch at index 4"));
    }

    #[test]
    fn test_sidecar_missing_is_none() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        assert_eq!(load_sidecar_columns(&model_path).unwrap(), None);
    }

    #[test]
    fn test_sidecar_column_list() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        fs::write(dir.path().join("model.features.json"), r#"["Age", "Energy_Consumption"]"#).unwrap();

        assert_eq!(
            load_sidecar_columns(&model_path).unwrap(),
            Some(vec!["Age".to_string(), "Energy_Consumption".to_string()])
        );
    }

    #[test]
    fn test_sidecar_malformed_is_unavailable() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        fs::write(dir.path().join("model.features.json"), r#"{"columns": 14}"#).unwrap();

        let err = load_sidecar_columns(&model_path).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ArtifactUnavailable { ref artifact, .. } if artifact == "classifier"
        ));
        assert!(err.to_string().contains("bad column list"));
    }

    #[test]
    fn test_unsupported_model_format() {
        let dir = tempdir().unwrap();
        copy_fixtures(dir.path());
        fs::write(dir.path().join("model.pkl"), b"\x80\x04").unwrap();

        let config = ArtifactConfig {
            model_file: "model.pkl".to_string(),
            ..ArtifactConfig::in_dir(dir.path())
        };
        let err = ArtifactSet::load(&config).err().unwrap();
        assert!(err.to_string().contains("unsupported model format"));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
