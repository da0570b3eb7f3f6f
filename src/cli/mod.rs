//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the relay using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// AEP Relay - batch delivery of pending records to Adobe Experience Platform
#[derive(Parser, Debug)]
#[command(name = "aep-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RELAY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the batch API over HTTP
    Serve(commands::serve::ServeArgs),

    /// Execute one batch run in this process
    Run(commands::run::RunArgs),

    /// Insert placeholder records
    Seed(commands::seed::SeedArgs),

    /// Seed records, wait, then trigger a run
    Daily(commands::daily::DailyArgs),

    /// Show recent batch runs
    History(commands::history::HistoryArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
