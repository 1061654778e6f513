//! End-to-end monitor runs over the in-memory source and sink.

mod common;

use std::io;
use std::time::Duration;

use telemetry::init_test_tracing;

use reshard::error::MonitorError;
use reshard::monitor::Monitor;
use reshard::sink::memory::MemorySink;
use reshard::source::memory::MemoryMetricsSource;

use crate::common::{test_config, worker};

#[tokio::test(start_paused = true)]
async fn test_monitor_runs_to_completion() {
    init_test_tracing();

    // One empty poll before the migration starts, two polls of progress,
    // then all workers disappear.
    let source = MemoryMetricsSource::new();
    source.enqueue_workers(vec![]).await;
    source
        .enqueue_workers(vec![worker("s1", 1_000, 250, 10, 4)])
        .await;
    source
        .enqueue_workers(vec![
            worker("s1", 1_000, 500, 20, 12),
            worker("s2", 200, 100, 3, 1),
        ])
        .await;
    source.enqueue_workers(vec![]).await;

    let sink = MemorySink::new();

    let mut monitor = Monitor::new(test_config(), source, sink.clone());
    monitor.start().await.unwrap();
    monitor.wait().await.unwrap();

    let visible = sink.visible().await.unwrap();

    // 600 of 1200 bytes copied across the cluster.
    assert!(visible.contains("[==========          ] 600 B / 1 kB cloned"));

    // Worker records persist through the final empty poll, sorted by name.
    let s1 = visible.find("Shard s1:").unwrap();
    let s2 = visible.find("Shard s2:").unwrap();
    assert!(s1 < s2);
}

#[tokio::test(start_paused = true)]
async fn test_monitor_reports_an_idle_cluster_until_shut_down() {
    init_test_tracing();

    // The scripted source is exhausted from the start, so every poll sees an
    // empty cluster and the lifecycle never leaves its initial phase.
    let source = MemoryMetricsSource::new();
    let sink = MemorySink::new();

    let mut monitor = Monitor::new(test_config(), source, sink.clone());
    monitor.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    monitor.shutdown_and_wait().await.unwrap();

    let visible = sink.visible().await.unwrap();
    assert!(visible.contains("[                    ] 0 B / 0 B cloned"));
    assert!(visible.contains("[                    ] 0 / 0 changelog entries applied"));
    assert!(!visible.contains("Shard"));
}

#[tokio::test(start_paused = true)]
async fn test_render_loop_redraws_between_polls() {
    init_test_tracing();

    let source = MemoryMetricsSource::new();
    source
        .enqueue_workers(vec![worker("s1", 1_000, 250, 10, 4)])
        .await;

    let sink = MemorySink::new();

    let mut monitor = Monitor::new(test_config(), source, sink.clone());
    monitor.start().await.unwrap();
    monitor.wait().await.unwrap();

    // The run spans one full poll interval before the exhausted script ends
    // it, during which the 60ms render cadence redraws many times over.
    let history = sink.history().await;
    assert!(history.len() > 5, "only {} redraws", history.len());
    assert!(history.last().unwrap().contains("Shard s1:"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_poll_failures_are_retried() {
    init_test_tracing();

    let source = MemoryMetricsSource::new();
    source
        .enqueue_error(MonitorError::Io(io::Error::other("connection reset")))
        .await;
    source
        .enqueue_workers(vec![worker("s1", 100, 100, 2, 2)])
        .await;

    let sink = MemorySink::new();

    let mut monitor = Monitor::new(test_config(), source, sink.clone());
    monitor.start().await.unwrap();
    monitor.wait().await.unwrap();

    // The failed poll was retried within its cycle instead of being read as
    // an empty cluster, so the worker still made it into the report.
    let visible = sink.visible().await.unwrap();
    assert!(visible.contains("Shard s1:"));
}

#[tokio::test(start_paused = true)]
async fn test_unrecoverable_poll_failure_aborts_the_run() {
    init_test_tracing();

    let config = test_config();

    let source = MemoryMetricsSource::new();
    for _ in 0..config.poll_retry.max_attempts {
        source
            .enqueue_error(MonitorError::Io(io::Error::other("connection reset")))
            .await;
    }
    // A completing run sits behind the failures, out of the retry budget's
    // reach.
    source.enqueue_workers(vec![worker("s1", 100, 100, 0, 0)]).await;

    let sink = MemorySink::new();

    let mut monitor = Monitor::new(config, source, sink);
    monitor.start().await.unwrap();

    let result = monitor.wait().await;
    assert!(matches!(result, Err(MonitorError::Io(_))));
}

#[tokio::test(start_paused = true)]
async fn test_monitor_cannot_be_started_twice() {
    init_test_tracing();

    let source = MemoryMetricsSource::new();
    let sink = MemorySink::new();

    let mut monitor = Monitor::new(test_config(), source, sink);
    monitor.start().await.unwrap();

    assert!(matches!(
        monitor.start().await,
        Err(MonitorError::InvalidState(_))
    ));

    monitor.shutdown_and_wait().await.unwrap();
}
