//! Server-sent change feed
//!
//! Emits one `snapshot` event per applied task set so displays can refetch
//! instead of polling.

use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use taskdeck_core::TaskSet;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEvent {
    pub generation: u64,
    pub task_count: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl From<&TaskSet> for SnapshotEvent {
    fn from(set: &TaskSet) -> Self {
        Self {
            generation: set.generation(),
            task_count: set.len(),
            fetched_at: set.fetched_at(),
        }
    }
}

/// Stream of snapshot changes, starting with the next one
pub fn snapshot_events(rx: watch::Receiver<Arc<TaskSet>>) -> impl Stream<Item = SnapshotEvent> {
    WatchStream::from_changes(rx).map(|set| SnapshotEvent::from(set.as_ref()))
}

/// GET /api/events
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = snapshot_events(state.task_store().subscribe())
        .map(|change| Event::default().event("snapshot").json_data(change));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/events", get(events))
}
