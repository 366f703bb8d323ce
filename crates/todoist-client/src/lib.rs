//! Todoist REST client
//!
//! Fetches the active task list for one account and turns it into
//! [`taskdeck_core::TaskSet`] snapshots. Requests are authenticated with a
//! bearer token and bounded by a timeout; failures are classified into
//! [`FetchError`] variants.

pub mod auth;
pub mod client;
pub mod error;
pub mod parser;
pub mod transport;

pub use auth::ApiKey;
pub use client::{TodoistClient, TodoistConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{FetchError, Result};
pub use parser::{parse_tasks, ParsedTasks};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};
