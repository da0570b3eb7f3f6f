//! PostgreSQL integration
//!
//! Stores pending records in `pending_records` and run log entries in `batch_log`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{PgRecordRow, PgRunRow};
