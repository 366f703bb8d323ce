//! Fixed-interval scheduler
//!
//! Ticks are anchored to the start time, not to callback completion, so a
//! slow callback does not shift the grid. A tick that arrives while the
//! previous callback is still running is skipped rather than queued.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SyncError};

/// Counters since the scheduler was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    /// Ticks that came due
    pub ticks: u64,
    /// Ticks that started the callback
    pub runs: u64,
    /// Ticks dropped because a callback was still running
    pub skipped: u64,
    /// Callbacks that returned an error or panicked
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    runs: AtomicU64,
    skipped: AtomicU64,
    failures: AtomicU64,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the callback ends, however it ends
struct InFlightGuard(Arc<Counters>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

pub struct IntervalScheduler {
    fire_immediately: bool,
    counters: Arc<Counters>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self {
            fire_immediately: false,
            counters: Arc::new(Counters::default()),
            handle: Mutex::new(None),
        }
    }

    /// Fire the first tick at start instead of one interval later
    pub fn with_fire_immediately(mut self, fire_immediately: bool) -> Self {
        self.fire_immediately = fire_immediately;
        self
    }

    /// Start calling `callback` every `interval`
    ///
    /// A running schedule is replaced. A zero interval is rejected and leaves
    /// any running schedule in place. Must be called from within a tokio
    /// runtime.
    pub fn start<F, Fut, E>(&self, interval: Duration, callback: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if interval.is_zero() {
            return Err(SyncError::invalid_config("scheduler interval must be non-zero"));
        }

        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = handle.take() {
            debug!("Restarting interval scheduler");
            previous.abort();
        }

        let counters = self.counters.clone();
        let first = if self.fire_immediately {
            Instant::now()
        } else {
            Instant::now() + interval
        };

        info!("Scheduler started with interval {:?}", interval);

        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                counters.ticks.fetch_add(1, Ordering::Relaxed);

                if counters
                    .in_flight
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    counters.skipped.fetch_add(1, Ordering::Relaxed);
                    debug!("Previous run still in progress, skipping tick");
                    continue;
                }
                counters.runs.fetch_add(1, Ordering::Relaxed);

                let guard = InFlightGuard(counters.clone());
                let run = tokio::spawn(callback());
                let counters = counters.clone();
                tokio::spawn(async move {
                    let _guard = guard;
                    match run.await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            counters.failures.fetch_add(1, Ordering::Relaxed);
                            warn!("Scheduled run failed: {}", e);
                        }
                        Err(e) if e.is_panic() => {
                            counters.failures.fetch_add(1, Ordering::Relaxed);
                            error!("Scheduled run panicked");
                        }
                        Err(_) => {}
                    }
                });
            }
        }));
        Ok(())
    }

    /// Cancel future ticks. A callback already running is left to finish.
    pub fn stop(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = handle.take() {
            task.abort();
            info!("Scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            runs: self.counters.runs.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
