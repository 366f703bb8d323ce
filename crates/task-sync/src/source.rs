//! Remote task source capability

use async_trait::async_trait;

use taskdeck_core::TaskSet;
use todoist_client::{FetchError, TodoistClient};

/// Where task snapshots come from
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch all active tasks as one snapshot tagged with `generation`
    async fn fetch(&self, generation: u64) -> Result<TaskSet, FetchError>;

    /// Mark a task as done remotely
    async fn close_task(&self, task_id: &str) -> Result<(), FetchError>;
}

#[async_trait]
impl TaskSource for TodoistClient {
    async fn fetch(&self, generation: u64) -> Result<TaskSet, FetchError> {
        self.fetch_task_set(generation).await
    }

    async fn close_task(&self, task_id: &str) -> Result<(), FetchError> {
        TodoistClient::close_task(self, task_id).await
    }
}
