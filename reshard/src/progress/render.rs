use humansize::{DECIMAL, FormatSizeOptions, format_size};

use crate::progress::tracker::{AggregateTotals, WorkerState};

/// Number of cells in a progress bar.
const BAR_WIDTH: usize = 20;

/// Indentation for per-worker detail lines.
const INDENT: &str = "    ";

/// Renders the full progress report for the given snapshot.
///
/// Pure text formatting; writing the report anywhere is the caller's
/// business. Workers are rendered in the order given, which the tracker
/// keeps sorted by shard name.
pub fn render_report(totals: &AggregateTotals, workers: &[WorkerState]) -> String {
    let mut report = format!(
        "Overall progress:\n\
         {} {} / {} cloned\n\
         {} {} / {} changelog entries applied\n\n\n",
        progress_bar(totals.bytes_copied, totals.bytes_to_copy),
        format_bytes(totals.bytes_copied),
        format_bytes(totals.bytes_to_copy),
        progress_bar(totals.changelog_applied, totals.changelog_fetched),
        totals.changelog_applied,
        totals.changelog_fetched,
    );

    for worker in workers {
        report.push_str(&render_worker(worker));
    }

    report
}

/// Renders the detail block for one worker.
fn render_worker(worker: &WorkerState) -> String {
    let metrics = worker.metrics();

    format!(
        "Shard {}:\n\n\
         {INDENT}Cloning initial data ... {} cloned\n\
         {INDENT}Fetching changelog entries ... {} changelog entries fetched\n\
         {INDENT}Applying changelog entries ...\n\
         {INDENT}{} / {} changelog entries applied\n\n",
        worker.shard_name(),
        format_bytes(metrics.bytes_copied),
        metrics.changelog_fetched,
        metrics.changelog_applied,
        metrics.changelog_fetched,
    )
}

/// Fixed-width ASCII progress bar.
///
/// Filled cells are `floor(value * width / total)`; a zero total renders an
/// empty bar. A value exceeding the total fills the bar completely, which
/// can happen while a shard's byte estimate lags behind its copy counter.
fn progress_bar(value: u64, total: u64) -> String {
    let filled = if total > 0 {
        ((value as u128 * BAR_WIDTH as u128) / total as u128) as usize
    } else {
        0
    };
    let filled = filled.min(BAR_WIDTH);

    format!("[{}{}]", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// Formats a byte count to the nearest decimal unit with no decimal places.
fn format_bytes(bytes: u64) -> String {
    format_size(bytes, FormatSizeOptions::from(DECIMAL).decimal_places(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::tracker::ProgressTracker;
    use crate::source::WorkerMetrics;

    #[test]
    fn test_bar_fill_is_floored() {
        assert_eq!(progress_bar(250, 1_000), "[=====               ]");
        assert_eq!(progress_bar(999, 1_000), "[=================== ]");
        assert_eq!(progress_bar(1_000, 1_000), "[====================]");
    }

    #[test]
    fn test_zero_total_renders_empty_bar() {
        assert_eq!(progress_bar(0, 0), "[                    ]");
        assert_eq!(progress_bar(42, 0), "[                    ]");
    }

    #[test]
    fn test_value_above_total_saturates_the_bar() {
        assert_eq!(progress_bar(300, 100), "[====================]");
    }

    #[test]
    fn test_byte_counts_round_to_nearest_unit() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(250), "250 B");
        assert_eq!(format_bytes(1_000), "1 kB");
        assert_eq!(format_bytes(2_000_000), "2 MB");
    }

    #[test]
    fn test_report_with_no_workers_shows_zero_filled_bars() {
        let report = render_report(&AggregateTotals::default(), &[]);

        assert_eq!(
            report,
            "Overall progress:\n\
             [                    ] 0 B / 0 B cloned\n\
             [                    ] 0 / 0 changelog entries applied\n\n\n"
        );
    }

    #[tokio::test]
    async fn test_report_for_a_single_worker() {
        let tracker = ProgressTracker::new();
        tracker
            .add_or_update(WorkerMetrics {
                shard: "s1".to_string(),
                approx_bytes_to_copy: 1_000,
                bytes_copied: 250,
                changelog_fetched: 10,
                changelog_applied: 4,
            })
            .await;

        let (totals, workers) = tracker.snapshot().await;
        let report = render_report(&totals, &workers);

        assert_eq!(
            report,
            "Overall progress:\n\
             [=====               ] 250 B / 1 kB cloned\n\
             [========            ] 4 / 10 changelog entries applied\n\n\n\
             Shard s1:\n\n\
             \x20   Cloning initial data ... 250 B cloned\n\
             \x20   Fetching changelog entries ... 10 changelog entries fetched\n\
             \x20   Applying changelog entries ...\n\
             \x20   4 / 10 changelog entries applied\n\n"
        );
    }
}
