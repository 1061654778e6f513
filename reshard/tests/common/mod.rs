//! Shared helpers for monitor integration tests.

use config::shared::{MonitorConfig, PgConnectionConfig, RetryConfig, TlsConfig};
use reshard::source::WorkerMetrics;

/// Builds the metrics a worker would report for one poll.
pub fn worker(shard: &str, to_copy: u64, copied: u64, fetched: u64, applied: u64) -> WorkerMetrics {
    WorkerMetrics {
        shard: shard.to_string(),
        approx_bytes_to_copy: to_copy,
        bytes_copied: copied,
        changelog_fetched: fetched,
        changelog_applied: applied,
    }
}

/// Monitor config for tests driving the in-memory source; the connection
/// settings are never used.
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        source: PgConnectionConfig {
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            username: "monitor".to_string(),
            password: None,
            tls: TlsConfig {
                trusted_root_certs: String::new(),
                enabled: false,
            },
        },
        poll_interval_ms: 1_000,
        render_interval_ms: 60,
        poll_retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 10,
            max_delay_ms: 100,
            backoff_factor: 2.0,
        },
    }
}
