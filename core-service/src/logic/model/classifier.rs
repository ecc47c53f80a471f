//! Classifier - Binary probabilistic classifier capability
//!
//! Class order is fixed as (abnormal, normal) to match training.

use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::vector::FeatureVector;

pub const ARTIFACT_NAME: &str = "classifier";

/// Training-time class labels, in predict_proba order
pub const CLASS_LABELS: [&str; 2] = ["Abnormal", "Normal"];

/// Allowed drift of p_abnormal + p_normal from 1.0
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

// ============================================================================
// CLASS PROBABILITIES
// ============================================================================

/// Probability pair, validated on construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    abnormal: f64,
    normal: f64,
}

impl ClassProbabilities {
    pub fn new(abnormal: f64, normal: f64) -> PipelineResult<Self> {
        let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);

        if !in_unit(abnormal) || !in_unit(normal) {
            return Err(PipelineError::Inference(format!(
                "probabilities outside [0, 1]: ({}, {})",
                abnormal, normal
            )));
        }
        if (abnormal + normal - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PipelineError::Inference(format!(
                "probabilities do not sum to 1: ({}, {})",
                abnormal, normal
            )));
        }

        Ok(Self { abnormal, normal })
    }

    /// From a raw `[p_abnormal, p_normal]` row
    pub fn from_row(row: &[f64]) -> PipelineResult<Self> {
        match row {
            [abnormal, normal] => Self::new(*abnormal, *normal),
            _ => Err(PipelineError::Inference(format!(
                "expected 2 class probabilities, got {}",
                row.len()
            ))),
        }
    }

    pub fn abnormal(&self) -> f64 {
        self.abnormal
    }

    pub fn normal(&self) -> f64 {
        self.normal
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Capability: feature vector → (p_abnormal, p_normal)
pub trait ProbabilisticClassifier: Send + Sync {
    /// Input columns declared by the artifact, when it carries them
    fn feature_names(&self) -> Option<&[String]>;

    /// Fixed input width declared by the artifact, when it has one
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Backend name for status/logging
    fn backend(&self) -> &'static str;

    fn predict_probabilities(&self, features: &FeatureVector) -> PipelineResult<ClassProbabilities>;
}

// ============================================================================
// LOGISTIC REGRESSION (JSON artifact)
// ============================================================================

/// Logistic regression weights, loaded from JSON at runtime.
///
/// `coef` scores the second class: `p_normal = sigmoid(coef · x + intercept)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Class labels in probability order; must equal `CLASS_LABELS`
    pub classes: Vec<String>,
    /// Input columns (must match the assembled schema)
    pub feature_names: Vec<String>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::artifact(ARTIFACT_NAME, format!("parse error: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Validate that the model is structurally sound
    pub fn validate(&self) -> PipelineResult<()> {
        if self.classes.len() != 2
            || self.classes.iter().zip(CLASS_LABELS.iter()).any(|(a, b)| a != b)
        {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!("class order must be {:?}, artifact has {:?}", CLASS_LABELS, self.classes),
            ));
        }
        if self.coef.len() != self.feature_names.len() {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!(
                    "dimension mismatch: {} coefficients for {} columns",
                    self.coef.len(),
                    self.feature_names.len()
                ),
            ));
        }
        if let Some((i, w)) = self.coef.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!("non-finite coefficient at index {}: {}", i, w),
            ));
        }
        if !self.intercept.is_finite() {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!("non-finite intercept: {}", self.intercept),
            ));
        }
        Ok(())
    }

    fn decision_function(&self, x: &[f64]) -> f64 {
        self.coef.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + self.intercept
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn backend(&self) -> &'static str {
        "logistic-regression"
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> PipelineResult<ClassProbabilities> {
        if features.len() != self.coef.len() {
            return Err(PipelineError::Inference(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                self.coef.len()
            )));
        }

        let normal = sigmoid(self.decision_function(features.as_slice()));
        ClassProbabilities::new(1.0 - normal, normal)
    }
}
