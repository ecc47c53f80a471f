//! Model status & reload handlers

use axum::{extract::State, Json};

use energy_theft_core::logic::pipeline::get_stats;

use crate::models::{ModelStatus, ReloadResponse};
use crate::{AppError, AppResult, AppState};

/// Loaded artifact fingerprints + counters
pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    let artifacts = state
        .registry
        .current()
        .ok()
        .and_then(|p| p.info().cloned());

    Json(ModelStatus {
        loaded: state.registry.is_loaded(),
        artifacts,
        stats: get_stats(),
    })
}

/// Reload artifacts from disk and swap them in atomically
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    tracing::info!("Reloading artifacts from {}", state.config.artifacts.artifact_dir.display());

    // Artifact I/O and session setup block; keep them off the runtime threads
    let registry = state.registry.clone();
    let config = state.config.artifacts.clone();
    let pipeline = tokio::task::spawn_blocking(move || registry.reload(&config))
        .await
        .map_err(|e| AppError::InternalError(format!("reload task failed: {}", e)))??;

    Ok(Json(ReloadResponse {
        reloaded: true,
        artifacts: pipeline.info().cloned(),
    }))
}
