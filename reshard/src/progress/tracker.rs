use std::sync::Arc;

use tokio::sync::Mutex;

use crate::source::WorkerMetrics;

/// Cluster-wide running sums over all tracked workers.
///
/// Each field equals the sum of the corresponding counter across every
/// tracked worker, an invariant [`ProgressTracker::add_or_update`] maintains
/// incrementally instead of recomputing the sums on every poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    pub bytes_to_copy: u64,
    pub bytes_copied: u64,
    pub changelog_fetched: u64,
    pub changelog_applied: u64,
}

impl AggregateTotals {
    fn add(&mut self, metrics: &WorkerMetrics) {
        self.bytes_to_copy += metrics.approx_bytes_to_copy;
        self.bytes_copied += metrics.bytes_copied;
        self.changelog_fetched += metrics.changelog_fetched;
        self.changelog_applied += metrics.changelog_applied;
    }

    fn subtract(&mut self, metrics: &WorkerMetrics) {
        self.bytes_to_copy -= metrics.approx_bytes_to_copy;
        self.bytes_copied -= metrics.bytes_copied;
        self.changelog_fetched -= metrics.changelog_fetched;
        self.changelog_applied -= metrics.changelog_applied;
    }
}

/// Latest observed metrics for one worker.
///
/// Created the first time a shard name is observed and kept for the life of
/// the monitoring session; each later observation replaces the metrics
/// wholesale.
#[derive(Debug, Clone)]
pub struct WorkerState {
    metrics: WorkerMetrics,
}

impl WorkerState {
    fn new(metrics: WorkerMetrics) -> Self {
        Self { metrics }
    }

    /// Name of the shard this state belongs to.
    pub fn shard_name(&self) -> &str {
        &self.metrics.shard
    }

    /// The most recently observed metrics.
    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    fn replace(&mut self, metrics: WorkerMetrics) {
        self.metrics = metrics;
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Tracked workers, sorted by shard name.
    workers: Vec<WorkerState>,
    totals: AggregateTotals,
}

/// Incrementally maintained view over per-worker migration progress.
///
/// Cheap to clone; the poll loop feeds records in while the render loop
/// reads snapshots out. A single lock guards the worker table and the totals
/// together, so a reader can never observe totals that don't sum over the
/// current record set.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<Inner>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Records the latest metrics for a worker.
    ///
    /// An unseen shard is inserted and the worker list re-sorted by shard
    /// name. A known shard has its previous metrics subtracted from the
    /// totals, its stored metrics replaced, and the new metrics added back,
    /// keeping the totals exact without a full recomputation.
    pub async fn add_or_update(&self, metrics: WorkerMetrics) {
        let mut inner = self.inner.lock().await;
        let Inner { workers, totals } = &mut *inner;

        match workers
            .iter_mut()
            .find(|worker| worker.shard_name() == metrics.shard)
        {
            Some(worker) => {
                totals.subtract(worker.metrics());
                worker.replace(metrics);
                totals.add(worker.metrics());
            }
            None => {
                totals.add(&metrics);
                workers.push(WorkerState::new(metrics));
                workers.sort_by(|a, b| a.shard_name().cmp(b.shard_name()));
            }
        }
    }

    /// Returns a snapshot of the current cluster-wide totals.
    pub async fn current_totals(&self) -> AggregateTotals {
        let inner = self.inner.lock().await;

        inner.totals
    }

    /// Returns a snapshot of all tracked workers, sorted by shard name.
    pub async fn tracked_workers(&self) -> Vec<WorkerState> {
        let inner = self.inner.lock().await;

        inner.workers.clone()
    }

    /// Returns totals and workers from a single lock acquisition, so both
    /// halves of a rendered report describe the same instant.
    pub async fn snapshot(&self) -> (AggregateTotals, Vec<WorkerState>) {
        let inner = self.inner.lock().await;

        (inner.totals, inner.workers.clone())
    }
}
