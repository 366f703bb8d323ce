//! Task synchronizer - owns the fetch cycle
//!
//! One cycle: allocate a generation, fetch, and either swap the snapshot in
//! the store or record the failure in the store's health. At most one cycle
//! runs at a time. After [`TaskSynchronizer::stop`] no cycle touches the
//! store again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use taskdeck_core::{Clock, SyncStatus, TaskStore};
use todoist_client::FetchError;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::scheduler::{IntervalScheduler, SchedulerStats};
use crate::source::TaskSource;

/// What a single call to [`TaskSynchronizer::run_cycle`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The fetched snapshot is now current
    Applied { generation: u64, task_count: usize },
    /// The fetch failed; the store keeps its snapshot
    Failed(FetchError),
    /// Another cycle was already running
    Skipped,
    /// The result arrived after a stop, or the store already had newer data
    Discarded { generation: u64 },
    /// The synchronizer is stopped
    Stopped,
}

/// Cycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    pub applied: u64,
    pub failed: u64,
    pub skipped: u64,
    pub discarded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub scheduler: SchedulerStats,
    pub cycles: CycleStats,
    /// Last generation handed out
    pub generation: u64,
}

#[derive(Default)]
struct CycleCounters {
    applied: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    discarded: AtomicU64,
}

impl CycleCounters {
    fn snapshot(&self) -> CycleStats {
        CycleStats {
            applied: self.applied.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

struct Inner {
    source: Arc<dyn TaskSource>,
    store: Arc<TaskStore>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    scheduler: IntervalScheduler,
    generation: AtomicU64,
    /// Held for the whole of a cycle
    cycle: Mutex<()>,
    stopped: watch::Sender<bool>,
    counters: CycleCounters,
}

/// Keeps a [`TaskStore`] in step with a remote [`TaskSource`]
#[derive(Clone)]
pub struct TaskSynchronizer {
    inner: Arc<Inner>,
}

impl TaskSynchronizer {
    pub fn new(
        source: Arc<dyn TaskSource>,
        store: Arc<TaskStore>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        let (stopped, _) = watch::channel(false);
        let scheduler = IntervalScheduler::new().with_fire_immediately(config.fetch_on_start());
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                clock,
                config,
                scheduler,
                generation: AtomicU64::new(0),
                cycle: Mutex::new(()),
                stopped,
                counters: CycleCounters::default(),
            }),
        }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.inner.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Begin periodic cycles. Also clears an earlier stop.
    pub fn start(&self) {
        self.inner.stopped.send_replace(false);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let scheduled = self
            .inner
            .scheduler
            .start(self.inner.config.poll_interval(), move || {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else {
                        return Ok(());
                    };
                    let sync = TaskSynchronizer { inner };
                    match sync.run_cycle().await {
                        CycleOutcome::Failed(e) => Err(e),
                        _ => Ok(()),
                    }
                }
            });
        if let Err(e) = scheduled {
            error!("Task synchronizer not started: {}", e);
            return;
        }

        info!(
            "Task synchronizer started (interval {:?}, fetch on start: {})",
            self.inner.config.poll_interval(),
            self.inner.config.fetch_on_start()
        );
    }

    /// Stop periodic cycles and abandon any fetch in progress
    pub fn stop(&self) {
        let was_stopped = self.inner.stopped.send_replace(true);
        self.inner.scheduler.stop();
        if !was_stopped {
            info!("Task synchronizer stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.stopped.borrow()
    }

    /// Whether periodic cycles are scheduled
    pub fn is_running(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    /// Run one fetch cycle now, unless one is already running
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self.is_stopped() {
            return CycleOutcome::Stopped;
        }

        let Ok(_guard) = self.inner.cycle.try_lock() else {
            self.inner.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Sync cycle already in progress, skipping");
            return CycleOutcome::Skipped;
        };
        self.locked_cycle().await
    }

    /// Run one fetch cycle after the one in progress, if any, has finished
    ///
    /// The fetch is guaranteed to start after this call.
    async fn run_cycle_after_current(&self) -> CycleOutcome {
        let _guard = self.inner.cycle.lock().await;
        self.locked_cycle().await
    }

    async fn locked_cycle(&self) -> CycleOutcome {
        let inner = &self.inner;
        let mut stopped = inner.stopped.subscribe();
        if *stopped.borrow_and_update() {
            return CycleOutcome::Stopped;
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Starting sync cycle {}", generation);

        let result = tokio::select! {
            result = inner.source.fetch(generation) => result,
            _ = stopped.wait_for(|stopped| *stopped) => {
                info!("Sync cycle {} abandoned by stop", generation);
                inner.counters.discarded.fetch_add(1, Ordering::Relaxed);
                return CycleOutcome::Discarded { generation };
            }
        };

        if *stopped.borrow() {
            inner.counters.discarded.fetch_add(1, Ordering::Relaxed);
            return CycleOutcome::Discarded { generation };
        }

        let now = inner.clock.now();
        match result {
            Ok(task_set) => {
                let task_count = task_set.len();
                if inner.store.replace(task_set) {
                    inner.store.record_success(now);
                    inner.counters.applied.fetch_add(1, Ordering::Relaxed);
                    info!("Sync cycle {} applied {} tasks", generation, task_count);
                    CycleOutcome::Applied {
                        generation,
                        task_count,
                    }
                } else {
                    inner.counters.discarded.fetch_add(1, Ordering::Relaxed);
                    CycleOutcome::Discarded { generation }
                }
            }
            Err(e) => {
                warn!("Sync cycle {} failed: {}", generation, e);
                inner.store.record_failure(e.kind(), e.to_string(), now);
                inner.counters.failed.fetch_add(1, Ordering::Relaxed);
                CycleOutcome::Failed(e)
            }
        }
    }

    /// Manual refresh, outside the regular schedule
    pub async fn refresh_now(&self) -> CycleOutcome {
        info!("Manual refresh requested");
        self.run_cycle().await
    }

    /// Close a task remotely, then refresh so the snapshot reflects it
    ///
    /// An error means the close itself failed. The returned outcome is that
    /// of the refresh, whose fetch always starts after the close succeeded:
    /// a cycle already in flight is waited for, not joined.
    pub async fn complete_task(&self, task_id: &str) -> Result<CycleOutcome> {
        if self.is_stopped() {
            return Err(SyncError::Stopped);
        }
        self.inner.source.close_task(task_id).await?;
        info!("Completed task {}, refreshing", task_id);
        Ok(self.run_cycle_after_current().await)
    }

    /// Store status judged against the configured staleness threshold
    pub fn status(&self) -> SyncStatus {
        self.inner
            .store
            .status(self.inner.clock.now(), self.inner.config.stale_after())
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            scheduler: self.inner.scheduler.stats(),
            cycles: self.inner.counters.snapshot(),
            generation: self.inner.generation.load(Ordering::SeqCst),
        }
    }
}
