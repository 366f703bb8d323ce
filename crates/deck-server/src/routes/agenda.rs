//! Agenda endpoint for the deck display

use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;

use taskdeck_core::{Agenda, SyncStatus};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaResponse {
    /// Local date the sections are relative to
    pub date: NaiveDate,
    pub status: SyncStatus,
    #[serde(flatten)]
    pub agenda: Agenda,
    /// Nothing overdue, due today or tomorrow
    pub empty: bool,
}

/// GET /api/agenda
async fn get_agenda(State(state): State<AppState>) -> Json<AgendaResponse> {
    let snapshot = state.task_store().current();
    let agenda = Agenda::build(&snapshot, state.clock(), state.agenda_limit());

    Json(AgendaResponse {
        date: state.clock().today(),
        status: state.synchronizer().status(),
        empty: agenda.is_empty(),
        agenda,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/agenda", get(get_agenda))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use taskdeck_core::{Due, Task};

    use crate::routes::test_support::{call, state_with, StaticSource};

    fn due(day: u32) -> Due {
        Due::on(NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
    }

    #[tokio::test]
    async fn agenda_groups_by_day() {
        let mut tasks = vec![
            Task::new("late", "Pay invoice").with_due(due(8)),
            Task::new("done", "Already done").with_due(due(10)).with_completed(true),
            Task::new("next", "Dentist").with_due(due(11)),
            Task::new("far", "Holiday").with_due(due(20)),
            Task::new("none", "Someday"),
        ];
        for i in 0..7 {
            tasks.push(Task::new(format!("t{i}"), format!("Today {i}")).with_due(due(10)));
        }
        let state = state_with(Arc::new(StaticSource::with_tasks(tasks)));
        state.synchronizer().run_cycle().await;

        let (status, payload) = call(super::router().with_state(state), "GET", "/api/agenda").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["date"], "2024-01-10");
        assert_eq!(payload["empty"], false);
        assert_eq!(payload["overdue"]["tasks"][0]["id"], "late");
        assert_eq!(payload["today"]["tasks"].as_array().unwrap().len(), 5);
        assert_eq!(payload["today"]["hidden"], 2);
        assert_eq!(payload["tomorrow"]["tasks"][0]["id"], "next");
        assert_eq!(payload["tomorrow"]["hidden"], 0);
    }

    #[tokio::test]
    async fn agenda_without_data_is_empty() {
        let state = state_with(Arc::new(StaticSource::default()));

        let (status, payload) = call(super::router().with_state(state), "GET", "/api/agenda").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["empty"], true);
        assert_eq!(payload["status"]["state"], "neverFetched");
    }
}
