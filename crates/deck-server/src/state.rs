//! Application state

use std::sync::Arc;

use task_sync::TaskSynchronizer;
use taskdeck_core::{Clock, TaskStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    synchronizer: TaskSynchronizer,
    clock: Arc<dyn Clock>,
    agenda_limit: usize,
}

impl AppState {
    pub fn new(synchronizer: TaskSynchronizer, clock: Arc<dyn Clock>, agenda_limit: usize) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                synchronizer,
                clock,
                agenda_limit,
            }),
        }
    }

    pub fn synchronizer(&self) -> &TaskSynchronizer {
        &self.inner.synchronizer
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &TaskStore {
        self.inner.synchronizer.store()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Maximum number of tasks per agenda section
    pub fn agenda_limit(&self) -> usize {
        self.inner.agenda_limit
    }
}
