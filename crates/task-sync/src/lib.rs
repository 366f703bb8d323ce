//! Task Sync - keeps a task snapshot current
//!
//! This crate runs the periodic fetch cycle: an [`IntervalScheduler`] drives a
//! [`TaskSynchronizer`], which pulls snapshots from a [`TaskSource`] into a
//! [`taskdeck_core::TaskStore`].

mod config;
mod error;
mod scheduler;
mod source;
mod synchronizer;

pub use config::{
    SyncConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STALE_FACTOR, MIN_POLL_INTERVAL,
};
pub use error::{Result, SyncError};
pub use scheduler::{IntervalScheduler, SchedulerStats};
pub use source::TaskSource;
pub use synchronizer::{CycleOutcome, CycleStats, SyncStats, TaskSynchronizer};
