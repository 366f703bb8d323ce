use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use taskdeck_core::{Clock, Task, TaskSet};

use crate::auth::ApiKey;
use crate::error::{FetchError, Result};
use crate::parser::parse_tasks;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com/rest/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`TodoistClient`]
#[derive(Debug, Clone)]
pub struct TodoistConfig {
    pub api_key: ApiKey,
    /// API root without trailing slash, e.g. `https://api.todoist.com/rest/v2`
    pub base_url: String,
    /// Upper bound for one complete request, body included
    pub timeout: Duration,
}

impl TodoistConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Authenticated client for the Todoist REST API
///
/// Every call is a single attempt. Retrying is left to the caller's schedule.
pub struct TodoistClient {
    config: TodoistConfig,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
}

impl TodoistClient {
    pub fn new(config: TodoistConfig, transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            transport,
            clock,
        }
    }

    /// Client on top of a default reqwest transport
    pub fn with_reqwest(config: TodoistConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()), clock)
    }

    pub fn config(&self) -> &TodoistConfig {
        &self.config
    }

    /// `GET {base}/tasks`, returning tasks in API order
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let url = format!("{}/tasks", self.config.base_url);
        let response = self.send(HttpRequest::get(url)).await?;

        let parsed = parse_tasks(&response.body, self.clock.today())?;
        if parsed.skipped > 0 {
            warn!("Skipped {} unusable task entries", parsed.skipped);
        }
        debug!("Parsed {} tasks", parsed.tasks.len());
        Ok(parsed.tasks)
    }

    /// Fetch all active tasks and package them as a sorted snapshot
    pub async fn fetch_task_set(&self, generation: u64) -> Result<TaskSet> {
        let tasks = self.fetch_tasks().await?;
        let fetched_at = self.clock.now();
        let set = TaskSet::new(tasks, fetched_at, generation, &self.clock.timezone());
        info!("Fetched {} tasks (generation {})", set.len(), generation);
        Ok(set)
    }

    /// `POST {base}/tasks/{id}/close`. Any 2xx counts as closed.
    pub async fn close_task(&self, task_id: &str) -> Result<()> {
        if task_id.trim().is_empty() {
            return Err(FetchError::invalid_request("task id is empty"));
        }
        let url = format!(
            "{}/tasks/{}/close",
            self.config.base_url,
            urlencoding::encode(task_id)
        );
        self.send(HttpRequest::post(url)).await?;
        info!("Closed task {}", task_id);
        Ok(())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let timeout = self.config.timeout;
        let after_ms = timeout.as_millis() as u64;
        let request = request
            .with_bearer(self.config.api_key.clone())
            .with_timeout(timeout);

        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Err(_) => return Err(FetchError::Timeout { after_ms }),
            Ok(Err(TransportError::Timeout)) => return Err(FetchError::Timeout { after_ms }),
            Ok(Err(TransportError::Connection(message))) => return Err(FetchError::network(message)),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            let err = FetchError::from_status(response.status);
            warn!("Todoist request failed: {}", err);
            return Err(err);
        }

        Ok(response)
    }
}
