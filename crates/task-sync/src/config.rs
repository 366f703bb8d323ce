//! Synchronizer configuration

use std::time::Duration;

use crate::error::{Result, SyncError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_STALE_FACTOR: u32 = 2;

/// Timing settings for the sync loop. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    poll_interval: Duration,
    request_timeout: Duration,
    fetch_on_start: bool,
    stale_factor: u32,
}

impl SyncConfig {
    /// Validate the polling interval against [`MIN_POLL_INTERVAL`]
    pub fn new(poll_interval: Duration) -> Result<Self> {
        if poll_interval < MIN_POLL_INTERVAL {
            return Err(SyncError::invalid_config(format!(
                "poll interval {}s is below the minimum of {}s",
                poll_interval.as_secs(),
                MIN_POLL_INTERVAL.as_secs()
            )));
        }
        Ok(Self {
            poll_interval,
            request_timeout: DEFAULT_REQUEST_TIMEOUT.min(poll_interval),
            fetch_on_start: false,
            stale_factor: DEFAULT_STALE_FACTOR,
        })
    }

    /// Request timeout, clamped to the polling interval
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(SyncError::invalid_config("request timeout must be positive"));
        }
        self.request_timeout = timeout.min(self.poll_interval);
        Ok(self)
    }

    /// Run the first cycle right away instead of after one interval
    pub fn with_fetch_on_start(mut self, fetch_on_start: bool) -> Self {
        self.fetch_on_start = fetch_on_start;
        self
    }

    /// Data older than `factor` polling intervals is reported as stale
    pub fn with_stale_factor(mut self, factor: u32) -> Result<Self> {
        if factor == 0 {
            return Err(SyncError::invalid_config("stale factor must be at least 1"));
        }
        self.stale_factor = factor;
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn fetch_on_start(&self) -> bool {
        self.fetch_on_start
    }

    /// Age after which the current snapshot counts as stale
    pub fn stale_after(&self) -> chrono::Duration {
        let secs = self.poll_interval.as_secs() * u64::from(self.stale_factor);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fetch_on_start: false,
            stale_factor: DEFAULT_STALE_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.fetch_on_start());
        assert_eq!(config.stale_after(), chrono::Duration::seconds(600));
    }

    #[test]
    fn test_interval_below_minimum_rejected() {
        let err = SyncConfig::new(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig { .. }));
        assert!(SyncConfig::new(MIN_POLL_INTERVAL).is_ok());
    }

    #[test]
    fn test_timeout_clamped_to_interval() {
        let config = SyncConfig::new(Duration::from_secs(20))
            .unwrap()
            .with_request_timeout(Duration::from_secs(60))
            .unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(20));

        assert!(SyncConfig::default()
            .with_request_timeout(Duration::ZERO)
            .is_err());
    }

    #[test]
    fn test_stale_factor() {
        let config = SyncConfig::new(Duration::from_secs(60))
            .unwrap()
            .with_stale_factor(3)
            .unwrap();
        assert_eq!(config.stale_after(), chrono::Duration::seconds(180));
        assert!(SyncConfig::default().with_stale_factor(0).is_err());
    }
}
