//! Pipeline Errors
//!
//! Mọi lỗi của core đều trả về đồng bộ cho caller, không retry.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Required field absent, of the wrong type or outside its domain
    #[error("Schema error on field '{field}': {reason}")]
    Schema { field: String, reason: String },

    /// Categorical value not known to the encoder at training time
    #[error("Unknown category '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    /// Artifact failed to load, failed validation or is not installed yet
    #[error("Artifact '{artifact}' unavailable: {reason}")]
    ArtifactUnavailable { artifact: String, reason: String },

    /// Classifier failed or returned an invalid distribution
    #[error("Inference error: {0}")]
    Inference(String),
}

impl PipelineError {
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_category(field: impl Into<String>, value: impl Into<String>) -> Self {
        PipelineError::UnknownCategory {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn artifact(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::ArtifactUnavailable {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Rejected input (caller's data), as opposed to a system fault
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PipelineError::Schema { .. } | PipelineError::UnknownCategory { .. }
        )
    }
}
