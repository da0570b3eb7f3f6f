//! Serve command implementation

use crate::cli::commands::{
    build_runner, connect_or_report, load_or_report, EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS,
};
use crate::cli::commands::run::sender_label;
use crate::server::{run_server, AppState};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Err(e) = config.validate() {
            println!("❌ Invalid server override");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG);
        }

        let stores = match connect_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let runner = match build_runner(&config, &stores) {
            Ok(r) => Arc::new(r),
            Err(code) => return Ok(code),
        };

        println!(
            "🌐 Serving batch API on http://{}:{}/api/batch/ ({} sender)",
            config.server.host,
            config.server.port,
            sender_label(config.aep.mock_mode)
        );

        let state = AppState::new(config, stores, runner);
        match run_server(state, shutdown_signal).await {
            Ok(()) => Ok(EXIT_SUCCESS),
            Err(e) => {
                tracing::error!(error = %e, "Batch API server failed");
                eprintln!("Server failed: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
