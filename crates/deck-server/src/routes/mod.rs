//! Route handlers

use axum::{http::StatusCode, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub mod agenda;
pub mod events;
pub mod health;
pub mod sync;
pub mod tasks;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// All endpoints, still waiting for their state
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(tasks::router())
        .merge(agenda::router())
        .merge(sync::router())
        .merge(events::router())
}
