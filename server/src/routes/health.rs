//! Health check and metrics endpoints.

use axum::{extract::State, routing::get, Json, Router};
use charger_engine::SyncReport;
use serde::Serialize;

use crate::metrics::MetricsSnapshot;
use crate::AppState;

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Most recent successful sync pass, if any has completed
    pub last_sync: Option<SyncReport>,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/", get(root))
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_sync: state.sync_status.last().await,
    })
}

/// Metrics handler.
async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Root handler.
async fn root() -> &'static str {
    "Charger Catalog Server"
}
