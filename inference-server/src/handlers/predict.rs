//! Prediction handler

use axum::{extract::State, Json};
use uuid::Uuid;

use energy_theft_core::RawInput;

use crate::models::PredictionResponse;
use crate::{AppError, AppResult, AppState};

/// Classify one raw record
pub async fn predict(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<PredictionResponse>> {
    let request_id = Uuid::new_v4();
    let pipeline = state.registry.current()?;

    let input = RawInput::from_value(&body)?;

    // Classifier backends may lock and run native sessions; keep them off the runtime threads
    let worker = pipeline.clone();
    let verdict = tokio::task::spawn_blocking(move || worker.classify_input(input))
        .await
        .map_err(|e| AppError::InternalError(format!("prediction task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(%request_id, "Prediction rejected: {}", e);
            e
        })?;

    tracing::info!(
        %request_id,
        label = verdict.label.as_str(),
        probability = verdict.probability,
        "Prediction served"
    );

    Ok(Json(PredictionResponse::new(
        request_id,
        verdict,
        pipeline.schema().layout_hash(),
    )))
}
