use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::MonitorResult;
use crate::sink::RenderSink;

/// In-memory sink for tests.
///
/// Keeps every written report so tests can assert on the full redraw
/// history; the "visible" state is the last write, matching the replacement
/// semantics of a real terminal sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the currently visible report, if anything has been written.
    pub async fn visible(&self) -> Option<String> {
        let inner = self.inner.lock().await;

        inner.last().cloned()
    }

    /// Returns every report written, oldest first.
    pub async fn history(&self) -> Vec<String> {
        let inner = self.inner.lock().await;

        inner.clone()
    }
}

impl RenderSink for MemorySink {
    async fn replace(&mut self, text: &str) -> MonitorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.push(text.to_string());

        Ok(())
    }
}
