//! Task module
//!
//! This module contains task-related types and logic.

mod model;
mod set;

pub use model::*;
pub use set::{sort_tasks, TaskSet};
