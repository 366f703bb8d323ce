//! Task API endpoints
//!
//! Read access to the current snapshot, plus closing a task on the remote.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use task_sync::SyncError;
use taskdeck_core::{SyncStatus, Task};
use todoist_client::FetchError;

use super::sync::CycleResponse;
use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub generation: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub status: SyncStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResponse {
    pub task_id: String,
    pub closed: bool,
    /// The refresh that follows a successful close
    pub refresh: CycleResponse,
}

/// GET /api/tasks - Current snapshot in display order
async fn list_tasks(State(state): State<AppState>) -> Json<TaskListResponse> {
    let snapshot = state.task_store().current();
    Json(TaskListResponse {
        generation: snapshot.generation(),
        fetched_at: snapshot.fetched_at(),
        status: state.synchronizer().status(),
        tasks: snapshot.tasks().to_vec(),
    })
}

/// GET /api/tasks/{id} - One task from the snapshot
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let snapshot = state.task_store().current();
    match snapshot.get(&id) {
        Some(task) => Ok(Json(task.clone())),
        None => Err(api_error(StatusCode::NOT_FOUND, format!("Task {} not found", id))),
    }
}

/// POST /api/tasks/{id}/close - Complete a task, then refresh
///
/// Once the close succeeded the response is 200, whatever the refresh did.
async fn close_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CloseResponse>, ApiError> {
    let outcome = state.synchronizer().complete_task(&id).await.map_err(|e| match e {
        SyncError::Fetch(FetchError::UnexpectedStatus { status: 404 }) => {
            api_error(StatusCode::NOT_FOUND, format!("Task {} not found", id))
        }
        SyncError::Fetch(FetchError::InvalidRequest { message }) => {
            api_error(StatusCode::BAD_REQUEST, message)
        }
        SyncError::Fetch(e) => api_error(StatusCode::BAD_GATEWAY, e.to_string()),
        SyncError::Stopped => api_error(StatusCode::SERVICE_UNAVAILABLE, "Synchronizer is stopped"),
        SyncError::InvalidConfig { message } => api_error(StatusCode::INTERNAL_SERVER_ERROR, message),
    })?;

    Ok(Json(CloseResponse {
        task_id: id,
        closed: true,
        refresh: CycleResponse::from(&outcome),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}/close", post(close_task))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use taskdeck_core::{Due, Task};
    use todoist_client::FetchError;

    use crate::routes::test_support::{call, state_with, StaticSource};

    fn due(day: u32) -> Due {
        Due::on(NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
    }

    #[tokio::test]
    async fn list_is_empty_before_first_sync() {
        let state = state_with(Arc::new(StaticSource::default()));

        let (status, payload) = call(super::router().with_state(state), "GET", "/api/tasks").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["generation"], 0);
        assert!(payload["fetchedAt"].is_null());
        assert_eq!(payload["status"]["state"], "neverFetched");
        assert_eq!(payload["tasks"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn list_returns_snapshot_in_due_order() {
        let source = StaticSource::with_tasks(vec![
            Task::new("a", "No due"),
            Task::new("b", "Later").with_due(due(12)),
            Task::new("c", "Sooner").with_due(due(10)),
        ]);
        let state = state_with(Arc::new(source));
        state.synchronizer().run_cycle().await;

        let (status, payload) = call(super::router().with_state(state), "GET", "/api/tasks").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = payload["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(payload["generation"], 1);
        assert_eq!(payload["fetchedAt"], "2024-01-10T08:00:00Z");
    }

    #[tokio::test]
    async fn get_single_task() {
        let source = StaticSource::with_tasks(vec![Task::new("42", "Call mum")]);
        let state = state_with(Arc::new(source));
        state.synchronizer().run_cycle().await;
        let app = super::router().with_state(state);

        let (status, payload) = call(app.clone(), "GET", "/api/tasks/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["content"], "Call mum");

        let (status, payload) = call(app, "GET", "/api/tasks/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"], "Task 7 not found");
    }

    #[tokio::test]
    async fn close_task_completes_and_refreshes() {
        let source = Arc::new(StaticSource::with_tasks(vec![Task::new("2", "Remaining")]));
        let state = state_with(source.clone());
        let app = super::router().with_state(state.clone());

        let (status, payload) = call(app.clone(), "POST", "/api/tasks/1/close").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["taskId"], "1");
        assert_eq!(payload["closed"], true);
        assert_eq!(payload["refresh"]["outcome"], "applied");
        assert_eq!(payload["refresh"]["taskCount"], 1);
        assert_eq!(*source.closed.lock().unwrap(), vec!["1".to_string()]);
        assert_eq!(state.task_store().current().len(), 1);

        let (status, _) = call(app.clone(), "POST", "/api/tasks/missing/close").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, payload) = call(app, "POST", "/api/tasks/%20/close").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Invalid request: task id is empty");
    }

    #[tokio::test]
    async fn close_reports_success_when_refresh_fails() {
        let source = Arc::new(StaticSource::failing(FetchError::network("connection reset")));
        let state = state_with(source.clone());

        let (status, payload) = call(super::router().with_state(state), "POST", "/api/tasks/1/close").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["closed"], true);
        assert_eq!(payload["refresh"]["outcome"], "failed");
        assert_eq!(payload["refresh"]["error"], "Network error: connection reset");
        assert_eq!(*source.closed.lock().unwrap(), vec!["1".to_string()]);
    }
}
