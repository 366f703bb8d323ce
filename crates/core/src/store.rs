//! Snapshot store for fetched tasks
//!
//! Holds the latest [`TaskSet`] and the health of the sync loop. Writers swap
//! whole snapshots; readers get an `Arc` to whichever snapshot was current and
//! are never blocked by a fetch in progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::task::TaskSet;

/// A failed sync cycle as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Short machine readable kind, e.g. `unauthorized` or `timeout`
    pub kind: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Health of the sync loop, kept apart from the task snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHealth {
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<FailureRecord>,
    pub consecutive_failures: u32,
}

impl SyncHealth {
    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.last_error.as_ref().map(|e| e.at)
    }
}

/// Result status of the current snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SyncStatus {
    /// No cycle has completed yet
    NeverFetched,
    /// Data is younger than the staleness threshold
    Fresh,
    /// Data is older than the staleness threshold
    Stale {
        #[serde(rename = "ageSecs")]
        age_secs: i64,
        #[serde(rename = "lastError")]
        last_error: Option<FailureRecord>,
    },
    /// Nothing was ever fetched and the last cycle failed
    Error {
        #[serde(rename = "lastError")]
        last_error: FailureRecord,
    },
}

/// Latest task snapshot plus sync health
pub struct TaskStore {
    snapshot: watch::Sender<Arc<TaskSet>>,
    health: watch::Sender<SyncHealth>,
}

impl TaskStore {
    /// Create a store holding the empty, never-fetched snapshot
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(TaskSet::empty()));
        let (health, _) = watch::channel(SyncHealth::default());
        Self { snapshot, health }
    }

    /// The latest snapshot
    pub fn current(&self) -> Arc<TaskSet> {
        self.snapshot.borrow().clone()
    }

    /// Swap in a new snapshot.
    ///
    /// Only applied when `task_set` is of a newer generation than the stored
    /// snapshot. Returns whether the swap happened; subscribers are notified
    /// only when it did.
    pub fn replace(&self, task_set: TaskSet) -> bool {
        let incoming = Arc::new(task_set);
        let mut current_generation = 0;
        let applied = self.snapshot.send_if_modified(|current| {
            current_generation = current.generation();
            if incoming.generation() <= current_generation {
                return false;
            }
            *current = Arc::clone(&incoming);
            true
        });

        if applied {
            debug!(
                "Applied task set generation {} ({} tasks)",
                incoming.generation(),
                incoming.len()
            );
        } else {
            warn!(
                "Discarding task set generation {}, store already holds generation {}",
                incoming.generation(),
                current_generation
            );
        }
        applied
    }

    /// Receiver that is notified after every applied [`TaskStore::replace`]
    pub fn subscribe(&self) -> watch::Receiver<Arc<TaskSet>> {
        self.snapshot.subscribe()
    }

    /// Record a completed cycle
    pub fn record_success(&self, at: DateTime<Utc>) {
        self.health.send_modify(|health| {
            health.last_success_at = Some(at);
            health.last_error = None;
            health.consecutive_failures = 0;
        });
    }

    /// Record a failed cycle; the task snapshot is left untouched
    pub fn record_failure(&self, kind: impl Into<String>, message: impl Into<String>, at: DateTime<Utc>) {
        let record = FailureRecord {
            kind: kind.into(),
            message: message.into(),
            at,
        };
        self.health.send_modify(|health| {
            health.last_error = Some(record);
            health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        });
    }

    pub fn health(&self) -> SyncHealth {
        self.health.borrow().clone()
    }

    /// Status of the current snapshot at `now`.
    ///
    /// Data older than `stale_after` is reported as stale, together with the
    /// last failure if there is one.
    pub fn status(&self, now: DateTime<Utc>, stale_after: chrono::Duration) -> SyncStatus {
        let snapshot = self.current();
        let health = self.health();

        match snapshot.age(now) {
            None => match health.last_error {
                Some(last_error) => SyncStatus::Error { last_error },
                None => SyncStatus::NeverFetched,
            },
            Some(age) if age > stale_after => SyncStatus::Stale {
                age_secs: age.num_seconds(),
                last_error: health.last_error,
            },
            Some(_) => SyncStatus::Fresh,
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
