use std::io;

use thiserror::Error;

/// Convenient result type for monitor operations using [`MonitorError`] as
/// the error type.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Main error type for monitor operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Connection or query against the metrics source failed.
    #[error("postgres error in the metrics source: {0}")]
    Source(#[from] tokio_postgres::Error),

    /// TLS setup for the metrics source connection failed.
    #[error("tls error in the metrics source: {0}")]
    SourceTls(#[from] rustls::Error),

    /// A metrics row is missing a column or carries an unparsable value.
    #[error("malformed metrics row: {0}")]
    MalformedRecord(String),

    /// An io error occurred, either reading certificates or writing to the
    /// render sink.
    #[error("an io error occurred: {0}")]
    Io(#[from] io::Error),

    /// An operation was attempted in a state that doesn't support it.
    #[error("monitor is in an invalid state: {0}")]
    InvalidState(&'static str),

    /// One of the monitor's loops panicked.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}
