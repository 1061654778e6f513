//! Core monitor orchestration and execution.
//!
//! Contains the main [`Monitor`] struct that couples the polling of a
//! metrics source with the continuous redraw of the progress report.
//! Manages loop lifecycles, shutdown coordination, and error handling.

use std::sync::Arc;

use config::shared::{MonitorConfig, RetryConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::concurrency::shutdown::{ShutdownRx, ShutdownTx, create_shutdown_channel};
use crate::error::{MonitorError, MonitorResult};
use crate::lifecycle::{Lifecycle, LifecyclePhase};
use crate::progress::render::render_report;
use crate::progress::tracker::ProgressTracker;
use crate::sink::RenderSink;
use crate::source::{MetricsSource, WorkerMetrics};

/// Internal state tracking for the monitor lifecycle.
#[derive(Debug)]
enum MonitorState {
    /// Monitor has been created but not yet started.
    Created,
    /// Both loops are running.
    Started {
        poll_task: JoinHandle<MonitorResult<()>>,
        render_task: JoinHandle<MonitorResult<()>>,
    },
}

/// Live progress monitor for one migration run.
///
/// A [`Monitor`] runs two independent periodic loops over shared state:
/// 1. **Poll loop** - queries the metrics source, feeds every record into
///    the progress tracker, and advances the inferred migration lifecycle.
/// 2. **Render loop** - redraws the progress report on a fast cadence,
///    independent of whether a new poll has completed.
///
/// Both loops stop once the lifecycle reaches its terminal phase or an
/// external shutdown signal arrives.
#[derive(Debug)]
pub struct Monitor<S, K> {
    config: Arc<MonitorConfig>,
    tracker: ProgressTracker,
    shutdown_tx: ShutdownTx,
    source: Option<S>,
    sink: Option<K>,
    state: MonitorState,
}

impl<S, K> Monitor<S, K>
where
    S: MetricsSource + Send + 'static,
    K: RenderSink + Send + 'static,
{
    /// Creates a new monitor over the given source and sink.
    ///
    /// The monitor is initially idle and must be explicitly started with
    /// [`Monitor::start`].
    pub fn new(config: MonitorConfig, source: S, sink: K) -> Self {
        // We create a watch channel of unit type since it is only used to
        // notify all subscribers that shutdown is needed.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            config: Arc::new(config),
            tracker: ProgressTracker::new(),
            shutdown_tx,
            source: Some(source),
            sink: Some(sink),
            state: MonitorState::Created,
        }
    }

    /// Returns a handle on the shared progress tracker.
    pub fn tracker(&self) -> ProgressTracker {
        self.tracker.clone()
    }

    /// Returns a handle for sending shutdown signals to this monitor.
    ///
    /// Multiple components can hold shutdown handles; when shutdown is
    /// signalled both loops finish their current cycle and terminate.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Starts the poll and render loops.
    pub async fn start(&mut self) -> MonitorResult<()> {
        if matches!(self.state, MonitorState::Started { .. }) {
            return Err(MonitorError::InvalidState("monitor is already started"));
        }

        let (Some(source), Some(sink)) = (self.source.take(), self.sink.take()) else {
            return Err(MonitorError::InvalidState("monitor cannot be restarted"));
        };

        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            render_interval_ms = self.config.render_interval_ms,
            "starting migration monitor"
        );

        // The sink is shared between both loops behind a lock, so a redraw
        // from one loop can never interleave with a redraw from the other.
        let sink = Arc::new(Mutex::new(sink));

        let poll_task = tokio::spawn(run_poll_loop(
            self.config.clone(),
            source,
            sink.clone(),
            self.tracker.clone(),
            self.shutdown_tx.clone(),
            self.shutdown_tx.subscribe(),
        ));
        let render_task = tokio::spawn(run_render_loop(
            self.config.clone(),
            sink,
            self.tracker.clone(),
            self.shutdown_tx.subscribe(),
        ));

        self.state = MonitorState::Started {
            poll_task,
            render_task,
        };

        Ok(())
    }

    /// Waits for both loops to terminate.
    ///
    /// If the monitor was never started, this returns immediately. The poll
    /// loop is waited on first: it is the loop that detects completion, and
    /// on its failure the render loop must be shut down since it would
    /// otherwise redraw a stale report forever.
    pub async fn wait(self) -> MonitorResult<()> {
        let MonitorState::Started {
            poll_task,
            render_task,
        } = self.state
        else {
            info!("monitor was not started, nothing to wait for");

            return Ok(());
        };

        let poll_result = flatten_task("poll", poll_task).await;
        if poll_result.is_err() {
            // If we fail to send the shutdown signal, the render loop is
            // already gone, which is fine.
            let _ = self.shutdown_tx.shutdown();

            info!("poll loop completed with an error, shutting down the render loop");
        }

        let render_result = flatten_task("render", render_task).await;

        poll_result.and(render_result)
    }

    /// Initiates graceful shutdown of the monitor.
    ///
    /// Returns immediately after sending the signal; use [`Monitor::wait`]
    /// to wait for both loops to actually stop.
    pub fn shutdown(&self) {
        info!("trying to shut down the monitor");

        if let Err(err) = self.shutdown_tx.shutdown() {
            error!("failed to send shutdown signal to the monitor: {}", err);
            return;
        }

        info!("shutdown signal successfully sent to both loops");
    }

    /// Initiates shutdown and waits for complete monitor termination.
    pub async fn shutdown_and_wait(self) -> MonitorResult<()> {
        self.shutdown();
        self.wait().await
    }
}

/// Awaits a loop task, mapping a panic to [`MonitorError::TaskPanicked`].
async fn flatten_task(
    name: &'static str,
    task: JoinHandle<MonitorResult<()>>,
) -> MonitorResult<()> {
    match task.await {
        Ok(result) => result,
        Err(_) => Err(MonitorError::TaskPanicked(name)),
    }
}

/// The poll-and-aggregate loop.
///
/// Each tick polls the metrics source (with bounded retry), feeds every
/// record into the tracker, advances the lifecycle with the snapshot's
/// worker count, and redraws once. Reaching [`LifecyclePhase::Finished`]
/// shuts the whole monitor down after a final redraw.
async fn run_poll_loop<S, K>(
    config: Arc<MonitorConfig>,
    source: S,
    sink: Arc<Mutex<K>>,
    tracker: ProgressTracker,
    shutdown_tx: ShutdownTx,
    mut shutdown_rx: ShutdownRx,
) -> MonitorResult<()>
where
    S: MetricsSource,
    K: RenderSink,
{
    let mut lifecycle = Lifecycle::new();
    let mut poll_interval = tokio::time::interval(config.poll_interval());
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutting down the poll loop");

                return Ok(());
            }
            _ = poll_interval.tick() => {}
        }

        let workers = match poll_with_retry(&source, &config.poll_retry).await {
            Ok(workers) => workers,
            Err(err) => {
                // A poll failure must never be read as "zero workers": that
                // would turn a transient outage into a spurious completion.
                error!("polling the metrics source failed, aborting the monitor: {}", err);

                let _ = shutdown_tx.shutdown();

                return Err(err);
            }
        };

        let worker_count = workers.len();
        for metrics in workers {
            tracker.add_or_update(metrics).await;
        }

        let phase = lifecycle.observe_worker_count(worker_count);

        // Each poll also redraws once on its own, so progress stays visible
        // even with a very slow render cadence, and the completion cycle
        // still paints the final state.
        render_once(&tracker, &sink).await;

        if phase == LifecyclePhase::Finished {
            let _ = shutdown_tx.shutdown();

            return Ok(());
        }
    }
}

/// The render loop: redraws the current snapshot on a fast fixed cadence
/// until shutdown is signalled.
async fn run_render_loop<K>(
    config: Arc<MonitorConfig>,
    sink: Arc<Mutex<K>>,
    tracker: ProgressTracker,
    mut shutdown_rx: ShutdownRx,
) -> MonitorResult<()>
where
    K: RenderSink,
{
    let mut render_interval = tokio::time::interval(config.render_interval());
    render_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutting down the render loop");

                return Ok(());
            }
            _ = render_interval.tick() => {}
        }

        render_once(&tracker, &sink).await;
    }
}

/// Renders the current aggregate state and writes it to the sink.
///
/// A failed write is logged and skipped; the next cycle redraws from
/// scratch anyway.
async fn render_once<K>(tracker: &ProgressTracker, sink: &Mutex<K>)
where
    K: RenderSink,
{
    let (totals, workers) = tracker.snapshot().await;
    let report = render_report(&totals, &workers);

    let mut sink = sink.lock().await;
    if let Err(err) = sink.replace(&report).await {
        warn!("failed to write the progress report: {}", err);
    }
}

/// Polls the metrics source, retrying transient failures with exponential
/// backoff up to the configured attempt budget.
async fn poll_with_retry<S>(source: &S, retry: &RetryConfig) -> MonitorResult<Vec<WorkerMetrics>>
where
    S: MetricsSource,
{
    let mut attempt = 1;

    loop {
        match source.poll_workers().await {
            Ok(workers) => return Ok(workers),
            Err(err) if attempt < retry.max_attempts => {
                let delay = retry.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    max_attempts = retry.max_attempts,
                    "polling the metrics source failed, retrying in {:?}: {}",
                    delay,
                    err
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
