//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

use energy_theft_core::PipelineError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Record rejected (schema violation or unknown category)
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    BadRequest(String),

    /// Artifacts not loaded or failed to load
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Unavailable(msg) => {
                tracing::error!("Artifacts unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Model artifacts unavailable")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Schema { .. } | PipelineError::UnknownCategory { .. } => {
                AppError::Rejected(err.to_string())
            }
            PipelineError::ArtifactUnavailable { .. } => AppError::Unavailable(err.to_string()),
            PipelineError::Inference(_) => AppError::InternalError(err.to_string()),
        }
    }
}
