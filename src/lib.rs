//! # AEP Relay - batch delivery to Adobe Experience Platform
//!
//! AEP Relay forwards customer records that have not been delivered yet to an Adobe
//! Experience Platform streaming collection endpoint, one XDM payload per record, and keeps an
//! append-only log of every batch run.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** unsent records from PostgreSQL (or an in-memory store)
//! - **Transforming** each record into a tenant-scoped XDM profile payload
//! - **Sending** payloads to AEP, or to a mock sender during development
//! - **Logging** each run with a `SUCCESS`, `FAILED` or `PARTIAL` rollup
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (runner, transform, generator, history report)
//! - [`adapters`] - External integrations (PostgreSQL, memory store, AEP)
//! - [`server`] - HTTP trigger, query and diagnostic endpoints
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aep_relay::adapters::aep::create_sender;
//! use aep_relay::adapters::store::create_stores;
//! use aep_relay::config::load_config;
//! use aep_relay::core::runner::BatchRunner;
//! use aep_relay::core::transform::PayloadTransformer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("relay.toml")?;
//!     let stores = create_stores(&config).await?;
//!     let sender = create_sender(&config.aep)?;
//!
//!     let runner = BatchRunner::from_stores(&stores, sender, PayloadTransformer::new(&config.aep));
//!     let outcome = runner.run().await?;
//!
//!     println!("{}: {} of {} delivered", outcome.batch_id, outcome.success_count, outcome.total_records);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`], whose error type is [`domain::RelayError`]. A
//! failed run is reported as a [`core::runner::RunFailure`] carrying the run id when one
//! was logged.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
