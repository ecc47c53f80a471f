//! Numeric Normalizer - Standard scaling with training-time parameters
//!
//! `(x - mean) / scale` per column. Parameters are loaded once and never
//! touched again during inference.

use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::layout::{expect_columns, NUMERIC_COLUMNS};

pub const ARTIFACT_NAME: &str = "numeric_normalizer";

/// Capability: standardize the designated numeric columns as a batch
pub trait NumericTransformer: Send + Sync {
    /// Input columns, in the order `transform` expects them
    fn feature_names(&self) -> &[String];

    fn transform(&self, values: &[f64]) -> PipelineResult<Vec<f64>>;
}

/// Standard scaler parameters từ training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(feature_names_in: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> PipelineResult<Self> {
        let scaler = Self { feature_names_in, mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load from a JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let scaler: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::artifact(ARTIFACT_NAME, format!("parse error: {}", e)))?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check that the artifact is structurally sound
    pub fn validate(&self) -> PipelineResult<()> {
        expect_columns(ARTIFACT_NAME, NUMERIC_COLUMNS, &self.feature_names_in)?;

        let n = self.feature_names_in.len();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!(
                    "dimension mismatch: {} columns, {} means, {} scales",
                    n,
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }

        for (i, (&m, &s)) in self.mean.iter().zip(self.scale.iter()).enumerate() {
            if !m.is_finite() || !s.is_finite() || s < 0.0 {
                return Err(PipelineError::artifact(
                    ARTIFACT_NAME,
                    format!("invalid parameters for '{}': mean={}, scale={}", self.feature_names_in[i], m, s),
                ));
            }
        }

        Ok(())
    }
}

impl NumericTransformer for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, values: &[f64]) -> PipelineResult<Vec<f64>> {
        if values.len() != self.mean.len() {
            return Err(PipelineError::schema(
                "<numeric>",
                format!("expected {} values, got {}", self.mean.len(), values.len()),
            ));
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| {
                // Constant columns were fit with scale 0; training treats them as 1
                let scale = if scale == 0.0 { 1.0 } else { scale };
                (x - mean) / scale
            })
            .collect())
    }
}
