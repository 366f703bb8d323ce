//! API credentials

use std::fmt;

use taskdeck_core::Error;

/// Todoist API token
///
/// Has no `Display` and a redacted `Debug`; [`ApiKey::expose`] is the only
/// way to read the token back.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a token; blank tokens are rejected
    pub fn new(raw: impl Into<String>) -> taskdeck_core::Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("API key not set".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}
