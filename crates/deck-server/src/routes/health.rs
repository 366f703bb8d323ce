//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use taskdeck_core::SyncStatus;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    syncing: bool,
    sync: SyncStatus,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        syncing: state.synchronizer().is_running(),
        sync: state.synchronizer().status(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
