//! Server configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use task_sync::{SyncConfig, SyncError, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use taskdeck_core::agenda::DEFAULT_SECTION_LIMIT;
use thiserror::Error;
use todoist_client::ApiKey;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: ApiKey,
    pub api_base_url: Option<String>,
    pub sync: SyncConfig,
    /// IANA timezone name used for "today"
    pub timezone: String,
    pub listen_addr: SocketAddr,
    pub agenda_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("TODOIST_API_KEY")
            .ok_or(ConfigError::Missing("TODOIST_API_KEY"))
            .and_then(|raw| ApiKey::new(raw).map_err(|_| ConfigError::Missing("TODOIST_API_KEY")))?;

        let poll_interval = secs(&var, "TASKDECK_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL)?;
        let request_timeout = secs(&var, "TASKDECK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?;
        let fetch_on_start = flag(&var, "TASKDECK_FETCH_ON_START", false);

        let sync = SyncConfig::new(poll_interval)?
            .with_request_timeout(request_timeout)?
            .with_fetch_on_start(fetch_on_start);

        let listen_addr = match var("TASKDECK_LISTEN_ADDR") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("TASKDECK_LISTEN_ADDR", &raw, e))?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid("TASKDECK_LISTEN_ADDR", DEFAULT_LISTEN_ADDR, e))?,
        };

        let agenda_limit = match var("TASKDECK_AGENDA_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid("TASKDECK_AGENDA_LIMIT", &raw, e))?,
            None => DEFAULT_SECTION_LIMIT,
        };

        Ok(Self {
            api_key,
            api_base_url: var("TASKDECK_API_BASE_URL").map(|v| v.trim().to_string()),
            sync,
            timezone: var("TASKDECK_TIMEZONE")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            listen_addr,
            agenda_limit,
        })
    }
}

fn secs(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::invalid(name, &raw, e)),
        None => Ok(default),
    }
}

fn flag(var: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    match var(name) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("TODOIST_API_KEY", "abc")])).unwrap();

        assert_eq!(config.api_key.expose(), "abc");
        assert!(config.api_base_url.is_none());
        assert_eq!(config.sync.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.sync.request_timeout(), Duration::from_secs(10));
        assert!(!config.sync.fetch_on_start());
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.listen_addr, "0.0.0.0:8081".parse::<SocketAddr>().unwrap());
        assert_eq!(config.agenda_limit, 5);
    }

    #[test]
    fn test_missing_key() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TODOIST_API_KEY")));

        let err = ServerConfig::from_lookup(lookup(&[("TODOIST_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TODOIST_API_KEY")));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TODOIST_API_KEY", "abc"),
            ("TASKDECK_POLL_INTERVAL_SECS", "60"),
            ("TASKDECK_REQUEST_TIMEOUT_SECS", "5"),
            ("TASKDECK_FETCH_ON_START", "yes"),
            ("TASKDECK_TIMEZONE", "Europe/Amsterdam"),
            ("TASKDECK_API_BASE_URL", "http://localhost:9000/rest/v2"),
            ("TASKDECK_LISTEN_ADDR", "127.0.0.1:3000"),
            ("TASKDECK_AGENDA_LIMIT", "3"),
        ]))
        .unwrap();

        assert_eq!(config.sync.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.sync.request_timeout(), Duration::from_secs(5));
        assert!(config.sync.fetch_on_start());
        assert_eq!(config.timezone, "Europe/Amsterdam");
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:9000/rest/v2"));
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.agenda_limit, 3);
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("TODOIST_API_KEY", "abc"),
            ("TASKDECK_POLL_INTERVAL_SECS", "often"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TASKDECK_POLL_INTERVAL_SECS", .. }));

        let err = ServerConfig::from_lookup(lookup(&[
            ("TODOIST_API_KEY", "abc"),
            ("TASKDECK_POLL_INTERVAL_SECS", "5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Sync(SyncError::InvalidConfig { .. })));
    }

    #[test]
    fn test_unknown_flag_value_keeps_default() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TODOIST_API_KEY", "abc"),
            ("TASKDECK_FETCH_ON_START", "maybe"),
        ]))
        .unwrap();
        assert!(!config.sync.fetch_on_start());
    }

    #[test]
    fn test_debug_hides_key() {
        let config = ServerConfig::from_lookup(lookup(&[("TODOIST_API_KEY", "very-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
