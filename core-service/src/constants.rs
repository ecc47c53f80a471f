//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change where artifacts are read from, only edit this file (or set env).

/// Default directory holding the trained artifacts
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Default numeric normalizer artifact
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";

/// Default categorical encoder artifact
pub const DEFAULT_ENCODER_FILE: &str = "encoder.json";

/// Default classifier artifact (`.onnx` or `.json`)
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Energy Theft Detection";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get artifact directory from environment or use default
pub fn get_artifact_dir() -> String {
    env_or("THEFT_ARTIFACT_DIR", DEFAULT_ARTIFACT_DIR)
}

pub fn get_scaler_file() -> String {
    env_or("THEFT_SCALER_FILE", DEFAULT_SCALER_FILE)
}

pub fn get_encoder_file() -> String {
    env_or("THEFT_ENCODER_FILE", DEFAULT_ENCODER_FILE)
}

pub fn get_model_file() -> String {
    env_or("THEFT_MODEL_FILE", DEFAULT_MODEL_FILE)
}

/// Expected SHA-256 of the classifier artifact, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("THEFT_MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}
