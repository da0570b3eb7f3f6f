//! History command implementation
//!
//! Prints the run log for a time window.

use crate::cli::commands::{connect_or_report, load_or_report, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::report::{load_history, render_history, HistoryWindow};
use chrono::Local;
use clap::Args;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show runs started in the last N days
    #[arg(long, default_value_t = 7, conflicts_with = "today")]
    pub days: u32,

    /// Show runs started today (local time)
    #[arg(long)]
    pub today: bool,
}

impl HistoryArgs {
    pub fn window(&self) -> HistoryWindow {
        if self.today {
            HistoryWindow::Today
        } else {
            HistoryWindow::Days(self.days)
        }
    }

    /// Execute the history command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let stores = match connect_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let now = Local::now();
        let window = self.window();

        let runs = match load_history(stores.runs.as_ref(), window, now).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load run history");
                println!("❌ Failed to load run history");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("📜 {}", window.title(now));
        println!();

        if runs.is_empty() {
            println!("No batch runs found.");
            println!("Run 'aep-relay run' or 'aep-relay daily' to start one.");
            return Ok(EXIT_SUCCESS);
        }

        print!("{}", render_history(&runs));
        Ok(EXIT_SUCCESS)
    }
}
