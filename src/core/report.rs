//! Run history report
//!
//! Selects runs from the log for a time window and renders them as a fixed-width table with
//! per-status totals. Used by the `history` command.

use crate::adapters::store::RunLog;
use crate::domain::{BatchRun, Result, RunStatus};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::fmt::Write;

const ERROR_PREVIEW_CHARS: usize = 80;
const RULE_WIDTH: usize = 100;

/// Time window of a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Runs started in the last N days
    Days(u32),
    /// Runs started since local midnight
    Today,
}

impl HistoryWindow {
    /// Earliest start time included in the window, never before the Unix epoch
    pub fn since(&self, now: DateTime<Local>) -> DateTime<Utc> {
        match self {
            Self::Days(days) => now
                .with_timezone(&Utc)
                .checked_sub_signed(Duration::days(i64::from(*days)))
                .map_or(DateTime::<Utc>::UNIX_EPOCH, |since| {
                    since.max(DateTime::<Utc>::UNIX_EPOCH)
                }),
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
                .unwrap_or(now - Duration::hours(24))
                .with_timezone(&Utc),
        }
    }

    /// Heading shown above the table
    pub fn title(&self, now: DateTime<Local>) -> String {
        match self {
            Self::Days(days) => format!("Batch runs in the last {days} day(s)"),
            Self::Today => format!("Batch runs today ({})", now.format("%Y-%m-%d")),
        }
    }
}

/// Run counts per terminal status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub partial: usize,
    pub running: usize,
}

impl HistoryStats {
    pub fn from_runs(runs: &[BatchRun]) -> Self {
        runs.iter().fold(
            Self {
                total: runs.len(),
                ..Self::default()
            },
            |mut stats, run| {
                match run.status {
                    RunStatus::Success => stats.success += 1,
                    RunStatus::Failed => stats.failed += 1,
                    RunStatus::Partial => stats.partial += 1,
                    RunStatus::Running => stats.running += 1,
                }
                stats
            },
        )
    }
}

/// Load the runs of a window, newest first
pub async fn load_history(
    runs: &(dyn RunLog + Send + Sync),
    window: HistoryWindow,
    now: DateTime<Local>,
) -> Result<Vec<BatchRun>> {
    runs.list_since(window.since(now)).await
}

fn error_preview(message: &str) -> String {
    if message.chars().count() > ERROR_PREVIEW_CHARS {
        let head: String = message.chars().take(ERROR_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}

/// Render runs as a table followed by totals
pub fn render_history(runs: &[BatchRun]) -> String {
    let mut out = String::new();
    let rule = "-".repeat(RULE_WIDTH);

    let _ = writeln!(
        out,
        "{:<20} {:<10} {:<8} {:<8} {:<8} {:<20}",
        "Batch ID", "Status", "Records", "Success", "Failed", "Started At"
    );
    let _ = writeln!(out, "{rule}");

    for run in runs {
        let started = run
            .started_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:<8} {:<8} {:<8} {:<20}",
            run.batch_id.as_str(),
            run.status.as_str(),
            run.total_records,
            run.success_count,
            run.fail_count,
            started
        );

        if let Some(message) = run.error_message.as_deref() {
            let _ = writeln!(out, "  └─ Error: {}", error_preview(message));
        }
    }

    let stats = HistoryStats::from_runs(runs);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total runs: {}", stats.total);
    let _ = write!(
        out,
        "  Success: {}, Failed: {}, Partial: {}",
        stats.success, stats.failed, stats.partial
    );
    if stats.running > 0 {
        let _ = write!(out, ", Running: {}", stats.running);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RunErrorEntry, RunId};

    fn finished(id: &str, success: u64, errors: &[RunErrorEntry]) -> BatchRun {
        let mut run = BatchRun::start(RunId::new(id).unwrap());
        run.total_records = success + errors.len() as u64;
        run.complete(success, errors, Utc::now()).unwrap();
        run
    }

    #[test]
    fn test_stats() {
        let runs = vec![
            finished("batch_00000001", 3, &[]),
            finished("batch_00000002", 0, &[RunErrorEntry::new(1, "HTTP 500")]),
            finished("batch_00000003", 2, &[RunErrorEntry::new(2, "HTTP 500")]),
            BatchRun::start(RunId::new("batch_00000004").unwrap()),
        ];

        let stats = HistoryStats::from_runs(&runs);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.running, 1);
    }

    #[test]
    fn test_render_truncates_errors() {
        let long_error = "x".repeat(200);
        let runs = vec![finished(
            "batch_00000002",
            0,
            &[RunErrorEntry::new(1, long_error)],
        )];

        let table = render_history(&runs);
        let error_line = table
            .lines()
            .find(|line| line.contains("Error:"))
            .unwrap();
        assert!(error_line.ends_with("..."));
        assert!(error_line.chars().count() < 120);
        assert!(table.contains("batch_00000002"));
        assert!(table.contains("Success: 0, Failed: 1, Partial: 0"));
    }

    #[test]
    fn test_window_since() {
        let now = Local::now();
        let week = HistoryWindow::Days(7).since(now);
        assert_eq!((now.with_timezone(&Utc) - week).num_days(), 7);

        let everything = HistoryWindow::Days(u32::MAX).since(now);
        assert_eq!(everything, DateTime::<Utc>::UNIX_EPOCH);

        let today = HistoryWindow::Today.since(now);
        assert!(today <= now.with_timezone(&Utc));
        assert!(now.with_timezone(&Utc) - today <= Duration::hours(25));
    }
}
