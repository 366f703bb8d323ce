//! Core library for Task Deck
//!
//! This crate contains the domain types shared by the sync loop and its
//! consumers:
//! - Task model and due-date evaluation
//! - Task snapshots and the snapshot store
//! - Clock capability
//! - Agenda view for small displays

pub mod agenda;
pub mod clock;
pub mod error;
pub mod store;
pub mod task;

pub use agenda::{Agenda, AgendaSection};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::Error;
pub use store::{FailureRecord, SyncHealth, SyncStatus, TaskStore};
pub use task::{Due, DueAt, Task, TaskPriority, TaskSet};

pub type Result<T> = std::result::Result<T, Error>;
