use std::io::Error;
use std::sync::Once;
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    panic::PanicHookInfo,
};

use config::Environment;
use thiserror::Error;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, InitError},
};
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};

/// Directory where rolling log files are written in production.
const LOG_DIR: &str = "logs";

/// Maximum number of rotated log files kept on disk.
const MAX_LOG_FILES: usize = 5;

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to build rolling file appender: {0}")]
    InitAppender(#[from] InitError),

    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),

    #[error("an io error occurred: {0}")]
    Io(#[from] Error),
}

/// Log flusher handle for ensuring logs are written before shutdown.
///
/// Production mode returns a [`WorkerGuard`] that must be kept alive for the
/// lifetime of the process. Development mode logs synchronously to the
/// terminal and needs no flushing.
#[must_use]
pub enum LogFlusher {
    /// Production flusher that ensures buffered logs reach the file.
    Flusher(WorkerGuard),
    /// Development flusher that doesn't require explicit flushing.
    NullFlusher,
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for test environments.
///
/// Call once at the beginning of a test and set `ENABLE_TRACING=1` to view
/// tracing output:
///
/// ```bash
/// ENABLE_TRACING=1 cargo test <test_name>
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            // The default environment is prod, which logs to files. Tests
            // want terminal output.
            Environment::Dev.set();
            let _log_flusher =
                init_tracing("test").expect("Failed to initialize tracing for tests");
        }
    });
}

/// Initializes tracing for the application.
///
/// Sets up structured logging with environment-appropriate output: rotating
/// JSON log files in production, pretty-printed console output in
/// development. The returned [`LogFlusher`] must be kept alive until exit.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    // Initialize the log tracer so that logs emitted through the `log` crate
    // by our dependencies are forwarded to the `tracing` subscriber.
    LogTracer::init()?;

    let is_prod = Environment::load()?.is_prod();

    // Default to `info` if no level is specified in `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_flusher = if is_prod {
        configure_prod_tracing(filter, app_name)?
    } else {
        configure_dev_tracing(filter)?
    };

    set_tracing_panic_hook();

    Ok(log_flusher)
}

/// Configures tracing for production environments.
///
/// Structured JSON logging to daily-rolling files via a non-blocking writer.
fn configure_prod_tracing(filter: EnvFilter, app_name: &str) -> Result<LogFlusher, TracingError> {
    let file_appender = rolling::Builder::new()
        .filename_prefix(app_name)
        .filename_suffix("log")
        .rotation(rolling::Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .build(LOG_DIR)?;

    // Non-blocking so that writing to the file never stalls the monitor's
    // render loop.
    let (file_appender, guard) = tracing_appender::non_blocking(file_appender);

    let format = fmt::format()
        .with_level(true)
        // ANSI colors are only for terminal output
        .with_ansi(false)
        .with_target(false);

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .event_format(format)
            .with_writer(file_appender)
            .json()
            .with_current_span(true)
            .with_span_list(true),
    );

    set_global_default(subscriber)?;

    Ok(LogFlusher::Flusher(guard))
}

/// Configures tracing for development environments.
///
/// Pretty-printed console logging with ANSI colors.
fn configure_dev_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let format = fmt::format()
        .with_level(true)
        .with_ansi(true)
        .pretty()
        // Line numbers and file names are noise at this crate's log volume.
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let subscriber = FmtSubscriber::builder()
        .event_format(format)
        .with_env_filter(filter)
        .finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}

/// Replaces the default panic hook with one that routes panic information
/// through `tracing` before delegating to the original hook.
fn set_tracing_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        panic_hook(info);
        prev_hook(info);
    }));
}

/// Logs panic payload, location, and backtrace as a structured event.
fn panic_hook(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::capture();
    let (backtrace, note) = match backtrace.status() {
        BacktraceStatus::Captured => (Some(backtrace), None),
        BacktraceStatus::Disabled => (
            None,
            Some("run with RUST_BACKTRACE=1 to display backtraces"),
        ),
        BacktraceStatus::Unsupported => {
            (None, Some("backtraces are not supported on this platform"))
        }
        _ => (None, Some("backtrace status is unknown")),
    };

    let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    };

    let location = panic_info.location().map(|location| location.to_string());

    tracing::error!(
        panic.payload = payload,
        payload.location = location,
        panic.backtrace = backtrace.map(tracing::field::display),
        panic.note = note,
        "a panic occurred",
    );
}
