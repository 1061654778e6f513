use std::io::{Write, stdout};

use crossterm::{
    cursor::MoveToPreviousLine,
    execute,
    terminal::{Clear, ClearType},
};

use crate::error::MonitorResult;
use crate::sink::RenderSink;

/// Renders reports in place on the terminal.
///
/// Each write moves the cursor back over the block written previously,
/// clears everything below it, and prints the new block, giving in-place
/// redraw semantics on a regular (non-alternate-screen) terminal. Lines
/// longer than the terminal width will wrap and throw the cursor math off.
#[derive(Debug, Default)]
pub struct TermSink {
    /// Number of lines emitted by the previous write.
    last_lines: u16,
}

impl TermSink {
    pub fn new() -> Self {
        Self { last_lines: 0 }
    }
}

impl RenderSink for TermSink {
    async fn replace(&mut self, text: &str) -> MonitorResult<()> {
        let mut out = stdout();

        if self.last_lines > 0 {
            execute!(
                out,
                MoveToPreviousLine(self.last_lines),
                Clear(ClearType::FromCursorDown)
            )?;
        }

        out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()?;

        self.last_lines = text.lines().count() as u16;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_line_accounting_tracks_the_last_write() {
        let mut sink = TermSink::new();

        sink.replace("a\nb\nc\n").await.unwrap();
        assert_eq!(sink.last_lines, 3);

        // A missing trailing newline still occupies a terminal line.
        sink.replace("a\nb").await.unwrap();
        assert_eq!(sink.last_lines, 2);
    }
}
