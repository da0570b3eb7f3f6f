//! Store abstraction traits
//!
//! Two narrow traits cover the persistence the relay needs: [`RecordStore`] for the pending
//! customer records and [`RunLog`] for the batch run log. Backends usually implement both on
//! the same type so they share one connection pool.

use crate::domain::{BatchRun, PendingRecord, RecordCounts, Result, RunId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Access to pending customer records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record that has not been delivered yet
    ///
    /// Records are ordered by `id` ascending.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::RelayError::Database`] if the store cannot be read.
    async fn fetch_unsent(&self) -> Result<Vec<PendingRecord>>;

    /// Flag the given records as delivered
    ///
    /// Only records that are still unsent are touched, so a repeated call is a no-op.
    ///
    /// # Returns
    ///
    /// The number of rows updated.
    async fn mark_sent(&self, ids: &[i64], at: DateTime<Utc>) -> Result<u64>;

    /// Total and unsent record counts
    async fn counts(&self) -> Result<RecordCounts>;

    /// Insert newly generated records
    async fn insert_records(&self, records: &[PendingRecord]) -> Result<u64>;

    /// Highest record id in the store, if any
    async fn last_record_id(&self) -> Result<Option<i64>>;

    /// Number of records whose email starts with `prefix`
    async fn count_email_prefix(&self, prefix: &str) -> Result<u64>;

    /// Test the connection to the backend
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }
}

/// Persistence for batch run log entries
#[async_trait]
pub trait RunLog: Send + Sync {
    /// Insert a new run in the `RUNNING` state
    async fn create_run(&self, run: &BatchRun) -> Result<()>;

    /// Write the terminal state of a run
    ///
    /// # Errors
    ///
    /// Fails if the stored run is no longer `RUNNING`; terminal runs are never overwritten.
    async fn finalize_run(&self, run: &BatchRun) -> Result<()>;

    /// Look up one run. `Ok(None)` means the id is unknown.
    async fn get_run(&self, batch_id: &RunId) -> Result<Option<BatchRun>>;

    /// Most recent runs, newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<BatchRun>>;

    /// Number of runs ever logged
    async fn count_runs(&self) -> Result<u64>;

    /// Runs started at or after `since`, newest first
    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<BatchRun>>;
}
