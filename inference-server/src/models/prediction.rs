//! Prediction models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use energy_theft_core::logic::model::ArtifactInfo;
use energy_theft_core::{PipelineStats, Verdict, VerdictLabel};

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    /// User-facing verdict string
    pub message: String,
    pub label: VerdictLabel,
    pub probability: f64,
    pub percentage: String,
    pub layout_hash: String,
}

impl PredictionResponse {
    pub fn new(request_id: Uuid, verdict: Verdict, layout_hash: u32) -> Self {
        Self {
            request_id,
            message: verdict.to_string(),
            label: verdict.label,
            probability: verdict.probability,
            percentage: verdict.percentage(),
            layout_hash: format!("{:08x}", layout_hash),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub artifacts: Option<ArtifactInfo>,
    pub stats: PipelineStats,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub reloaded: bool,
    pub artifacts: Option<ArtifactInfo>,
}
