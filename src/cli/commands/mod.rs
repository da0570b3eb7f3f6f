//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | run finished `PARTIAL` |
//! | 2 | configuration error |
//! | 3 | run failed, rejected or `FAILED` |
//! | 4 | store or endpoint unreachable |
//! | 5 | fatal error |
//! | 130 | interrupted |

pub mod daily;
pub mod history;
pub mod run;
pub mod seed;
pub mod serve;
pub mod validate;

use crate::adapters::aep::create_sender;
use crate::adapters::store::{create_stores, Stores};
use crate::config::{load_config, RelayConfig};
use crate::core::runner::{BatchRunner, RunFailure, RunOutcome};
use crate::core::transform::PayloadTransformer;
use crate::domain::RunStatus;
use std::sync::Arc;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_RUN_FAILED: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Load the configuration, printing the error on failure
fn load_or_report(config_path: &str) -> Result<RelayConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Connect the configured store, printing the error on failure
async fn connect_or_report(config: &RelayConfig) -> Result<Stores, i32> {
    create_stores(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to the record store");
        println!("❌ Failed to connect to database");
        println!("   Error: {e}");
        EXIT_CONNECTION
    })
}

/// Build the runner for the configured sender
fn build_runner(config: &RelayConfig, stores: &Stores) -> Result<BatchRunner, i32> {
    let sender = create_sender(&config.aep).map_err(|e| {
        tracing::error!(error = %e, "Failed to create AEP sender");
        println!("❌ Failed to create AEP sender");
        println!("   Error: {e}");
        EXIT_CONFIG
    })?;

    Ok(BatchRunner::from_stores(
        stores,
        sender,
        PayloadTransformer::new(&config.aep),
    ))
}

/// Exit code for a finished run
pub fn outcome_exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Success => EXIT_SUCCESS,
        RunStatus::Partial => EXIT_PARTIAL,
        RunStatus::Failed | RunStatus::Running => EXIT_RUN_FAILED,
    }
}

fn print_outcome(outcome: &RunOutcome) {
    println!("📊 Batch Summary:");
    println!("  Batch ID: {}", outcome.batch_id);
    println!("  Status: {}", outcome.batch_status);
    println!("  Total: {}", outcome.total_records);
    println!("  Success: {}", outcome.success_count);
    println!("  Failed: {}", outcome.fail_count);
    println!("  Success Rate: {:.2}%", outcome.success_rate());

    if let Some(message) = &outcome.message {
        println!("  {message}");
    }

    if let Some(errors) = &outcome.errors {
        println!();
        println!("⚠️  Failed records:");
        for entry in errors.iter().take(10) {
            println!("  - #{}: {}", entry.record_id, entry.error);
        }
        if errors.len() > 10 {
            println!("  ... and {} more", errors.len() - 10);
        }
    }
    println!();
}

fn print_failure(failure: &RunFailure) {
    if failure.is_overlap() {
        println!("⚠️  Batch run rejected: {}", failure.error);
        return;
    }

    println!("❌ Batch run failed");
    if let Some(batch_id) = &failure.batch_id {
        println!("   Batch ID: {batch_id}");
    }
    println!("   Error: {}", failure.error);
}

/// Execute one run on `runner` and report it
async fn run_and_report(runner: Arc<BatchRunner>) -> i32 {
    match runner.run().await {
        Ok(outcome) => {
            print_outcome(&outcome);
            outcome_exit_code(outcome.batch_status)
        }
        Err(failure) => {
            print_failure(&failure);
            EXIT_RUN_FAILED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(outcome_exit_code(RunStatus::Success), 0);
        assert_eq!(outcome_exit_code(RunStatus::Partial), 1);
        assert_eq!(outcome_exit_code(RunStatus::Failed), 3);
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let result = load_or_report("/nonexistent/relay.toml");
        assert_eq!(result.err(), Some(EXIT_CONFIG));
    }
}
