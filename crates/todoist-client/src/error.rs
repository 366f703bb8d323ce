//! Error types for todoist-client

use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure of one request against the task API
///
/// Messages never contain the API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The API rejected the key (HTTP 401/403)
    #[error("API key rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Connection, DNS or body transfer failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// No complete response within the configured bound
    #[error("Request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// Body is not JSON, or not an array at the top level
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Any other non-success status
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// Rejected locally; nothing was sent
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl FetchError {
    /// Create a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            _ => Self::UnexpectedStatus { status },
        }
    }

    /// Short machine readable name, used in status reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Parse { .. } => "parse",
            Self::UnexpectedStatus { .. } => "http_status",
            Self::InvalidRequest { .. } => "invalid_request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(FetchError::from_status(401), FetchError::Unauthorized { status: 401 });
        assert_eq!(FetchError::from_status(403), FetchError::Unauthorized { status: 403 });
        assert_eq!(
            FetchError::from_status(503),
            FetchError::UnexpectedStatus { status: 503 }
        );
    }

    #[test]
    fn test_kind_and_message() {
        let err = FetchError::Timeout { after_ms: 10_000 };
        assert_eq!(err.kind(), "timeout");
        assert_eq!(err.to_string(), "Request timed out after 10000 ms");
    }
}
