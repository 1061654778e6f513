//! Metrics sources the monitor can poll for per-shard migration progress.

use std::future::Future;

use crate::error::MonitorResult;

pub mod memory;
pub mod postgres;

/// Progress counters reported by one recipient shard of the migration.
///
/// All counters are expected to be monotone non-decreasing while the shard is
/// healthy; the monitor displays whatever the source reports and performs no
/// enforcement of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMetrics {
    /// Name of the shard reporting these counters. Unique within a poll.
    pub shard: String,
    /// Estimated total number of bytes this shard has to copy.
    pub approx_bytes_to_copy: u64,
    /// Number of bytes copied so far.
    pub bytes_copied: u64,
    /// Number of change-log entries fetched from donor shards.
    pub changelog_fetched: u64,
    /// Number of fetched change-log entries applied locally.
    pub changelog_applied: u64,
}

/// A queryable view over the workers currently participating in a migration.
pub trait MetricsSource {
    /// Returns the metrics of every worker with an in-progress migration,
    /// sorted by shard name.
    ///
    /// An empty list means no migration is active, which is how both the
    /// pre-start and post-completion states look from the outside.
    fn poll_workers(&self) -> impl Future<Output = MonitorResult<Vec<WorkerMetrics>>> + Send;
}
