//! Error types for task-sync

use thiserror::Error;
use todoist_client::FetchError;

/// Result type alias for synchronizer operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors surfaced by the synchronizer outside of regular cycles
///
/// Cycle failures are not errors at this level: they are reported through
/// [`crate::CycleOutcome`] and recorded in the store's health.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration rejected at construction
    #[error("Invalid sync configuration: {message}")]
    InvalidConfig { message: String },

    /// A remote call made on behalf of a user action failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The synchronizer was stopped
    #[error("Synchronizer is stopped")]
    Stopped,
}

impl SyncError {
    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
