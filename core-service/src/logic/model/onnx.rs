//! ONNX Classifier - ONNX Runtime Integration
//!
//! Load và chạy binary classifier đã export sang ONNX.
//! Expects a float input of shape `[1, L]` and a float probability output of
//! shape `[1, 2]` in (abnormal, normal) order. Export with ZipMap disabled:
//! a sequence-of-maps output is rejected at load.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{Value, ValueType};
use parking_lot::Mutex;

use super::classifier::{ClassProbabilities, ProbabilisticClassifier, ARTIFACT_NAME};
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::vector::FeatureVector;

/// f32 outputs may drift from 1.0 by this much before renormalizing
const F32_SUM_TOLERANCE: f64 = 1e-4;

/// ONNX-backed classifier
pub struct OnnxClassifier {
    // ort sessions run through &mut
    session: Mutex<Session>,
    output_name: String,
    input_width: Option<usize>,
    feature_names: Option<Vec<String>>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("output_name", &self.output_name)
            .field("input_width", &self.input_width)
            .field("feature_names", &self.feature_names)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model từ file
    pub fn load(model_path: &str) -> PipelineResult<Self> {
        log::info!("Loading ONNX classifier from: {}", model_path);

        if !std::path::Path::new(model_path).exists() {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!("Model not found: {}", model_path),
            ));
        }

        let session = Session::builder()
            .map_err(|e| artifact_error(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| artifact_error(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| artifact_error(format!("Failed to load model: {}", e)))?;

        Self::from_session(session)
    }

    /// Load ONNX model từ bytes
    pub fn load_from_bytes(model_bytes: &[u8]) -> PipelineResult<Self> {
        log::info!("Loading ONNX classifier from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| artifact_error(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| artifact_error(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| artifact_error(format!("Load from memory error: {}", e)))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> PipelineResult<Self> {
        let input = session
            .inputs
            .first()
            .ok_or_else(|| artifact_error("No input defined".to_string()))?;

        let input_width = match &input.input_type {
            ValueType::Tensor { shape, .. } => {
                let dims: Vec<i64> = shape.iter().copied().collect();
                declared_width(&dims)
            }
            other => {
                return Err(artifact_error(format!(
                    "input '{}' is not a tensor: {:?}",
                    input.name, other
                )))
            }
        };

        // Only float tensors can carry the probability row
        let float_outputs: Vec<&str> = session
            .outputs
            .iter()
            .filter(|o| {
                matches!(
                    o.output_type,
                    ValueType::Tensor { ty: TensorElementType::Float32, .. }
                )
            })
            .map(|o| o.name.as_str())
            .collect();

        let output_name = pick_probability_output(&float_outputs).ok_or_else(|| {
            artifact_error(format!(
                "no float tensor output among {:?} (export without ZipMap)",
                session.outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>()
            ))
        })?;

        match input_width {
            Some(width) => log::info!(
                "ONNX classifier ready (input width: {}, probability output: {})",
                width,
                output_name
            ),
            None => log::warn!(
                "ONNX classifier ready (dynamic input width, probability output: {})",
                output_name
            ),
        }

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            input_width,
            feature_names: None,
        })
    }

    /// Attach the training column list (ONNX graphs don't carry names)
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }
}

fn artifact_error(reason: String) -> PipelineError {
    PipelineError::artifact(ARTIFACT_NAME, reason)
}

/// Fixed column count of a `[batch, L]` input; `None` when symbolic
fn declared_width(dims: &[i64]) -> Option<usize> {
    match dims {
        [_, width] if *width > 0 => usize::try_from(*width).ok(),
        _ => None,
    }
}

/// skl2onnx names the float row "probabilities"; otherwise take the last one
fn pick_probability_output(float_outputs: &[&str]) -> Option<String> {
    float_outputs
        .iter()
        .find(|name| **name == "probabilities")
        .or_else(|| float_outputs.last())
        .map(|name| name.to_string())
}

/// Probability row narrowed through f32; renormalize within tolerance
fn probabilities_from_row(row: &[f64]) -> PipelineResult<ClassProbabilities> {
    let total: f64 = row.iter().sum();
    if row.len() == 2 && total > 0.0 && (total - 1.0).abs() < F32_SUM_TOLERANCE {
        return ClassProbabilities::from_row(&[row[0] / total, row[1] / total]);
    }
    ClassProbabilities::from_row(row)
}

impl ProbabilisticClassifier for OnnxClassifier {
    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> PipelineResult<ClassProbabilities> {
        let input_array = Array2::<f32>::from_shape_vec((1, features.len()), features.to_f32())
            .map_err(|e| PipelineError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PipelineError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PipelineError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| PipelineError::Inference("No output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Inference(format!("Extract error: {}", e)))?;

        let row: Vec<f64> = output_tensor.1.iter().map(|&p| p as f64).collect();
        probabilities_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renormalize_f32_drift() {
        let p = probabilities_from_row(&[0.700_03, 0.300_02]).unwrap();
        assert!((p.abnormal() + p.normal() - 1.0).abs() < 1e-12);
        assert!((p.abnormal() - 0.700_03 / 1.000_05).abs() < 1e-12);
    }

    #[test]
    fn test_row_with_three_classes_rejected() {
        let err = probabilities_from_row(&[0.2, 0.3, 0.5]).unwrap_err();
        assert!(matches!(err, PipelineError::Inference(_)));
    }

    #[test]
    fn test_row_far_from_one_rejected() {
        // Outside the f32 tolerance: not a probability pair
        let err = probabilities_from_row(&[0.4, 0.5]).unwrap_err();
        assert!(err.to_string().contains("do not sum to 1"));
    }

    #[test]
    fn test_declared_width() {
        assert_eq!(declared_width(&[-1, 14]), Some(14));
        assert_eq!(declared_width(&[1, 13]), Some(13));
        assert_eq!(declared_width(&[-1, -1]), None);
        assert_eq!(declared_width(&[14]), None);
    }

    #[test]
    fn test_pick_probability_output() {
        assert_eq!(
            pick_probability_output(&["probabilities", "scores"]),
            Some("probabilities".to_string())
        );
        assert_eq!(pick_probability_output(&["logits", "scores"]), Some("scores".to_string()));
        assert_eq!(pick_probability_output(&[]), None);
    }
}
