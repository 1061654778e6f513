use config::shared::{MonitorConfig, PgConnectionConfig, RetryConfig};
use reshard::monitor::Monitor;
use reshard::sink::RenderSink;
use reshard::sink::terminal::TermSink;
use reshard::source::MetricsSource;
use reshard::source::postgres::PgMetricsSource;
use tracing::{info, warn};

/// Runs the monitor service until the migration finishes or a shutdown
/// signal arrives.
pub async fn start_monitor(config: MonitorConfig) -> anyhow::Result<()> {
    info!("starting migration monitor service");

    log_config(&config);

    let source = PgMetricsSource::connect(config.source.clone()).await?;
    let sink = TermSink::new();

    run_monitor(Monitor::new(config, source, sink)).await?;

    info!("migration monitor service completed");

    Ok(())
}

fn log_config(config: &MonitorConfig) {
    log_source_config(&config.source);
    log_poll_retry_config(&config.poll_retry);

    info!(
        poll_interval_ms = config.poll_interval_ms,
        render_interval_ms = config.render_interval_ms,
        "cadence config"
    );
}

fn log_source_config(config: &PgConnectionConfig) {
    info!(
        host = config.host,
        port = config.port,
        dbname = config.name,
        username = config.username,
        tls_enabled = config.tls.enabled,
        "source postgres connection config",
    );
}

fn log_poll_retry_config(config: &RetryConfig) {
    info!(
        max_attempts = config.max_attempts,
        initial_delay_ms = config.initial_delay_ms,
        max_delay_ms = config.max_delay_ms,
        backoff_factor = config.backoff_factor,
        "poll retry config"
    )
}

async fn run_monitor<S, K>(mut monitor: Monitor<S, K>) -> anyhow::Result<()>
where
    S: MetricsSource + Send + 'static,
    K: RenderSink + Send + 'static,
{
    // Start the monitor loops.
    monitor.start().await?;

    // Spawn a task to listen for shutdown signals and trigger shutdown.
    let shutdown_tx = monitor.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        // Listen for SIGTERM as well, so the monitor also stops cleanly when
        // terminated by a supervisor rather than from a keyboard.
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT (Ctrl+C) received, shutting down the monitor");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down the monitor");
            }
        }

        if let Err(e) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {:?}", e);
            return;
        }

        info!("monitor shutdown successfully")
    });

    // Wait for the monitor to finish (either normally or via shutdown).
    let result = monitor.wait().await;

    // If the migration finished before any signal arrived, the signal task
    // is still parked on its select; abort it instead of leaving it behind.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    result?;

    Ok(())
}
