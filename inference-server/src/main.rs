//! Energy Theft Detection - Inference Server
//!
//! HTTP front for the inference core: the form/UI posts a raw record,
//! the server answers with the verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  ENERGY THEFT SERVER                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────┐   │
//! │  │  API      │ ─────► │  ArtifactRegistry            │   │
//! │  │  (Axum)   │        │  Arc<InferencePipeline>      │   │
//! │  └───────────┘        └──────────────┬───────────────┘   │
//! │                                      ▼                   │
//! │              scaler.json · encoder.json · model.onnx     │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;


use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use energy_theft_core::{ArtifactRegistry, InferencePipeline};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "energy_theft_server=debug,energy_theft_core=info,tower_http=debug".into()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Energy Theft Server starting...");
    tracing::info!("Artifacts: {}", config.artifacts.artifact_dir.display());

    // Artifacts must load before serving anything
    let pipeline = InferencePipeline::load(&config.artifacts)
        .map_err(|e| anyhow::anyhow!("startup aborted: {}", e))?;

    let state = AppState {
        registry: Arc::new(ArtifactRegistry::with_pipeline(pipeline)),
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ArtifactRegistry>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/model", get(handlers::model::status))
        .route("/api/v1/model/reload", post(handlers::model::reload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
