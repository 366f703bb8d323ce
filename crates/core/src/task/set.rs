//! Immutable task snapshots

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::model::Task;

/// Snapshot of all known tasks as returned by one fetch cycle
///
/// A `TaskSet` is never modified after construction; the store swaps whole
/// snapshots. `generation` orders snapshots so that a late result of an older
/// cycle can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSet {
    tasks: Vec<Task>,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl TaskSet {
    /// The initial snapshot: no tasks, never fetched
    pub fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            fetched_at: None,
            generation: 0,
        }
    }

    /// Build a snapshot, ordering tasks by due date (see [`sort_tasks`])
    pub fn new(mut tasks: Vec<Task>, fetched_at: DateTime<Utc>, generation: u64, tz: &Tz) -> Self {
        sort_tasks(&mut tasks, tz);
        Self {
            tasks,
            fetched_at: Some(fetched_at),
            generation,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this snapshot came from a completed fetch
    pub fn is_fetched(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Time elapsed since the fetch, `None` for the initial snapshot
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.fetched_at.map(|at| now - at)
    }
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Order tasks by due date ascending, tasks without due date last.
///
/// Equal due keys are ordered by priority (P1 first); anything still equal
/// keeps the order it arrived in.
pub fn sort_tasks(tasks: &mut [Task], tz: &Tz) {
    tasks.sort_by_key(|task| {
        let due = task.due.as_ref().map(|due| due.at.sort_key(tz));
        (due.is_none(), due, task.priority)
    });
}
