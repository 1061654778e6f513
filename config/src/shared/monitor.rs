use std::time::Duration;

use serde::Deserialize;

use crate::shared::{PgConnectionConfig, RetryConfig, ValidationError};

/// Default cadence, in milliseconds, at which the metrics source is polled.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default cadence, in milliseconds, at which the progress report is redrawn.
const DEFAULT_RENDER_INTERVAL_MS: u64 = 60;

/// Configuration for the monitor service.
///
/// Aggregates the connection to the cluster coordinator, the two loop
/// cadences, and the retry policy applied to failed polls. Typically
/// deserialized from the `configuration/` directory at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Connection to the Postgres coordinator exposing migration progress.
    pub source: PgConnectionConfig,
    /// Interval between polls of the metrics source.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Interval between redraws of the progress report.
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,
    /// Retry policy for failed polls.
    #[serde(default)]
    pub poll_retry: RetryConfig,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_render_interval_ms() -> u64 {
    DEFAULT_RENDER_INTERVAL_MS
}

impl MonitorConfig {
    /// Interval between polls of the metrics source.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Interval between redraws of the progress report.
    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    /// Validates the loaded [`MonitorConfig`].
    ///
    /// Checks the TLS configuration, the retry policy, and that both loop
    /// cadences are non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.tls.validate()?;
        self.poll_retry.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("poll_interval_ms"));
        }
        if self.render_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("render_interval_ms"));
        }

        Ok(())
    }
}
