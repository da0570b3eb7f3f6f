//! Domain models and types for the relay.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`RunId`])
//! - **Records** ([`PendingRecord`], [`RecordCounts`])
//! - **Run log entries** ([`BatchRun`], [`RunStatus`], [`RunErrorEntry`])
//! - **Error types** ([`RelayError`]) and the [`Result`] alias
//!
//! # Run lifecycle
//!
//! ```rust
//! use aep_relay::domain::{BatchRun, RunErrorEntry, RunId, RunStatus};
//! use chrono::Utc;
//!
//! # fn example() -> aep_relay::domain::Result<()> {
//! let mut run = BatchRun::start(RunId::generate());
//! run.total_records = 3;
//! run.complete(2, &[RunErrorEntry::new(2, "HTTP 500")], Utc::now())?;
//! assert_eq!(run.status, RunStatus::Partial);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod run;

pub use errors::RelayError;
pub use ids::RunId;
pub use record::{PendingRecord, RecordCounts};
pub use result::Result;
pub use run::{BatchRun, RunErrorEntry, RunStatus};
