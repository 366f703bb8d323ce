//! Sync status and manual refresh
//!
//! `POST /api/sync` is the deck's "retry" action: it runs one cycle right away
//! and reports what happened.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use task_sync::{CycleOutcome, SyncStats};
use taskdeck_core::{SyncHealth, SyncStatus};

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub status: SyncStatus,
    pub health: SyncHealth,
    pub stats: SyncStats,
    pub running: bool,
    pub poll_interval_secs: u64,
    pub stale_after_secs: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&CycleOutcome> for CycleResponse {
    fn from(outcome: &CycleOutcome) -> Self {
        let (outcome, generation, task_count, error) = match outcome {
            CycleOutcome::Applied {
                generation,
                task_count,
            } => ("applied", Some(*generation), Some(*task_count), None),
            CycleOutcome::Discarded { generation } => ("discarded", Some(*generation), None, None),
            CycleOutcome::Failed(e) => ("failed", None, None, Some(e.to_string())),
            CycleOutcome::Skipped => ("skipped", None, None, None),
            CycleOutcome::Stopped => ("stopped", None, None, None),
        };
        Self {
            outcome,
            generation,
            task_count,
            error,
        }
    }
}

/// Map a cycle outcome to a response; cycles that did not run or failed
/// become API errors
fn cycle_response(outcome: CycleOutcome) -> Result<Json<CycleResponse>, ApiError> {
    match outcome {
        CycleOutcome::Applied { .. } | CycleOutcome::Discarded { .. } => {
            Ok(Json(CycleResponse::from(&outcome)))
        }
        CycleOutcome::Failed(e) => Err(api_error(StatusCode::BAD_GATEWAY, e.to_string())),
        CycleOutcome::Skipped => Err(api_error(StatusCode::CONFLICT, "Sync already in progress")),
        CycleOutcome::Stopped => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Synchronizer is stopped",
        )),
    }
}

/// GET /api/sync/status
async fn sync_status(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    let sync = state.synchronizer();
    Json(SyncStatusResponse {
        status: sync.status(),
        health: state.task_store().health(),
        stats: sync.stats(),
        running: sync.is_running(),
        poll_interval_secs: sync.config().poll_interval().as_secs(),
        stale_after_secs: sync.config().stale_after().num_seconds(),
    })
}

/// POST /api/sync - Run one cycle now
async fn trigger_sync(State(state): State<AppState>) -> Result<Json<CycleResponse>, ApiError> {
    cycle_response(state.synchronizer().refresh_now().await)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync/status", get(sync_status))
        .route("/api/sync", post(trigger_sync))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use taskdeck_core::Task;
    use todoist_client::FetchError;

    use crate::routes::test_support::{call, state_with, StaticSource};

    #[tokio::test]
    async fn manual_sync_applies_snapshot() {
        let source = StaticSource::with_tasks(vec![Task::new("1", "Water plants")]);
        let state = state_with(Arc::new(source));
        let app = super::router().with_state(state.clone());

        let (status, payload) = call(app.clone(), "POST", "/api/sync").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["outcome"], "applied");
        assert_eq!(payload["generation"], 1);
        assert_eq!(payload["taskCount"], 1);

        let (status, payload) = call(app, "GET", "/api/sync/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"]["state"], "fresh");
        assert_eq!(payload["stats"]["cycles"]["applied"], 1);
        assert_eq!(payload["pollIntervalSecs"], 300);
        assert_eq!(payload["staleAfterSecs"], 600);
        assert_eq!(payload["running"], false);
    }

    #[tokio::test]
    async fn failed_sync_is_bad_gateway() {
        let source = StaticSource::failing(FetchError::Unauthorized { status: 401 });
        let state = state_with(Arc::new(source));
        let app = super::router().with_state(state.clone());

        let (status, payload) = call(app.clone(), "POST", "/api/sync").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(payload["error"], "API key rejected (HTTP 401)");

        let (_, payload) = call(app, "GET", "/api/sync/status").await;
        assert_eq!(payload["status"]["state"], "error");
        assert_eq!(payload["status"]["lastError"]["kind"], "unauthorized");
        assert_eq!(payload["health"]["consecutiveFailures"], 1);
        assert!(state.task_store().current().is_empty());
    }

    #[tokio::test]
    async fn sync_after_stop_is_unavailable() {
        let state = state_with(Arc::new(StaticSource::default()));
        state.synchronizer().stop();

        let (status, _) = call(super::router().with_state(state), "POST", "/api/sync").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
