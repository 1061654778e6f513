//! Sinks the rendered progress report is written to.

use std::future::Future;

use crate::error::MonitorResult;

pub mod memory;
pub mod terminal;

/// A display that always shows the most recently written report.
pub trait RenderSink {
    /// Atomically replaces the previously displayed report with `text`.
    ///
    /// After two consecutive writes the visible state is the second text
    /// alone, never a concatenation of both.
    fn replace(&mut self, text: &str) -> impl Future<Output = MonitorResult<()>> + Send;
}
