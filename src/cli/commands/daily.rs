//! Daily command implementation
//!
//! The scheduled job: seed a batch of placeholder records, wait, then trigger a run. By
//! default the run is triggered through the HTTP API of a running `serve` process so that
//! its single-run gate applies.

use crate::cli::commands::seed::seed_and_report;
use crate::cli::commands::{
    build_runner, connect_or_report, load_or_report, outcome_exit_code, run_and_report,
    EXIT_CONNECTION, EXIT_INTERRUPTED, EXIT_RUN_FAILED,
};
use crate::config::DatabaseTarget;
use crate::domain::{RelayError, Result, RunStatus};
use clap::Args;
use reqwest::ClientBuilder;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the daily command
#[derive(Args, Debug)]
pub struct DailyArgs {
    /// Number of records to create (defaults to generator.batch_size)
    #[arg(long)]
    pub count: Option<usize>,

    /// Seconds to wait between seeding and the run (defaults to generator.wait_seconds)
    #[arg(long)]
    pub wait: Option<u64>,

    /// Run the batch in this process instead of calling the HTTP API
    #[arg(long)]
    pub in_process: bool,
}

impl DailyArgs {
    /// Execute the daily command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting daily batch job");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let stores = match connect_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let count = self.count.unwrap_or(config.generator.batch_size);
        if let Err(code) = seed_and_report(stores.records.as_ref(), &config.generator, count).await
        {
            return Ok(code);
        }

        let wait = self.wait.unwrap_or(config.generator.wait_seconds);
        println!("⏳ Waiting {wait}s before the run...");
        if !countdown(wait, &mut shutdown_signal).await {
            println!("⚠️  Daily job interrupted before the run; seeded records stay unsent.");
            tracing::info!("Daily job interrupted by user signal");
            return Ok(EXIT_INTERRUPTED);
        }

        // A memory store is private to this process, so a server could never see the seed
        let in_process = self.in_process || config.database_target == DatabaseTarget::Memory;

        if in_process {
            let runner = match build_runner(&config, &stores) {
                Ok(r) => Arc::new(r),
                Err(code) => return Ok(code),
            };
            println!("🚀 Running batch in-process");
            println!();
            return Ok(run_and_report(runner).await);
        }

        let url = &config.generator.trigger_url;
        let timeout = Duration::from_secs(config.generator.trigger_timeout_seconds);
        println!("🚀 Triggering batch run at {url}");
        println!();

        match trigger_run(url, timeout).await {
            Ok(response) => {
                response.print();
                Ok(response.exit_code())
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to trigger batch run");
                println!("❌ Failed to reach the batch API");
                println!("   Error: {e}");
                Ok(EXIT_CONNECTION)
            }
        }
    }
}

/// Count down `wait` seconds on one line
///
/// Returns `false` if the shutdown signal fired first.
pub async fn countdown(wait: u64, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    for remaining in (1..=wait).rev() {
        print!("\r  Remaining: {:02}:{:02}", remaining / 60, remaining % 60);
        let _ = std::io::stdout().flush();

        tokio::select! {
            _ = ticker.tick() => {}
            Ok(()) = shutdown.changed() => {
                if *shutdown.borrow() {
                    println!();
                    return false;
                }
            }
        }
    }

    if wait > 0 {
        println!("\r  Remaining: 00:00");
    }
    true
}

/// Reply of the batch API to a trigger
#[derive(Debug, Clone)]
pub struct TriggerResponse {
    pub status_code: u16,
    pub body: Value,
}

impl TriggerResponse {
    /// Rollup status of a completed run
    pub fn batch_status(&self) -> Option<RunStatus> {
        serde_json::from_value(self.body.get("batch_status")?.clone()).ok()
    }

    pub fn exit_code(&self) -> i32 {
        match (self.status_code, self.batch_status()) {
            (200, Some(status)) => outcome_exit_code(status),
            _ => EXIT_RUN_FAILED,
        }
    }

    fn field(&self, name: &str) -> String {
        match self.body.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn print(&self) {
        match self.status_code {
            200 => {
                println!("✅ Batch run completed");
                println!("  Batch ID: {}", self.field("batch_id"));
                println!("  Status: {}", self.field("batch_status"));
                println!("  Total: {}", self.field("total_records"));
                println!("  Success: {}", self.field("success_count"));
                println!("  Failed: {}", self.field("fail_count"));
            }
            409 => println!("⚠️  Batch run rejected: {}", self.field("error")),
            code => {
                println!("❌ Batch run failed: HTTP {code}");
                println!("   Batch ID: {}", self.field("batch_id"));
                println!("   Error: {}", self.field("error"));
            }
        }
        println!();
    }
}

/// POST to the run endpoint and wait for the run to finish
///
/// # Errors
///
/// Returns [`RelayError::Sender`] if the endpoint cannot be reached or times out. Any HTTP
/// status is a successful call; inspect [`TriggerResponse::status_code`].
pub async fn trigger_run(url: &str, timeout: Duration) -> Result<TriggerResponse> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::Sender(format!("Failed to build HTTP client: {e}")))?;

    let response = client
        .post(url)
        .send()
        .await
        .map_err(|e| RelayError::Sender(format!("Trigger request failed: {e}")))?;

    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| RelayError::Sender(format!("Failed to read trigger response: {e}")))?;

    // Non-JSON bodies (e.g. from a proxy) are kept as a string
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    tracing::info!(url = %url, status_code = status_code, "Batch run triggered");
    Ok(TriggerResponse { status_code, body })
}
