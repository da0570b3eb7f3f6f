//! Run command implementation
//!
//! Executes one batch run in-process, without the HTTP surface.

use crate::cli::commands::{build_runner, connect_or_report, load_or_report, run_and_report};
use clap::Args;
use std::sync::Arc;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let stores = match connect_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let runner = match build_runner(&config, &stores) {
            Ok(r) => Arc::new(r),
            Err(code) => return Ok(code),
        };

        println!("🚀 Running batch ({} sender)", sender_label(config.aep.mock_mode));
        println!();

        Ok(run_and_report(runner).await)
    }
}

pub(crate) fn sender_label(mock_mode: bool) -> &'static str {
    if mock_mode {
        "mock"
    } else {
        "live"
    }
}
