use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{MonitorError, MonitorResult};
use crate::source::{MetricsSource, WorkerMetrics};

/// Scripted metrics source for tests.
///
/// Responses are served in the order they were enqueued; once the script is
/// exhausted every further poll sees an empty cluster, mirroring a migration
/// whose workers have all finished.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetricsSource {
    inner: Arc<Mutex<VecDeque<MonitorResult<Vec<WorkerMetrics>>>>>,
}

impl MemoryMetricsSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Enqueues a successful poll response.
    pub async fn enqueue_workers(&self, workers: Vec<WorkerMetrics>) {
        let mut inner = self.inner.lock().await;
        inner.push_back(Ok(workers));
    }

    /// Enqueues a failed poll response.
    pub async fn enqueue_error(&self, error: MonitorError) {
        let mut inner = self.inner.lock().await;
        inner.push_back(Err(error));
    }
}

impl MetricsSource for MemoryMetricsSource {
    async fn poll_workers(&self) -> MonitorResult<Vec<WorkerMetrics>> {
        let mut inner = self.inner.lock().await;

        inner.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
