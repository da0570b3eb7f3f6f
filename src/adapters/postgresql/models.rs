//! PostgreSQL row models
//!
//! Row shapes of the `pending_records` and `batch_log` tables and their conversion to
//! domain types. Counts are stored as `BIGINT` and converted at this boundary.

use crate::domain::{BatchRun, PendingRecord, RelayError, Result, RunId, RunStatus};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Columns selected for a pending record
pub const RECORD_COLUMNS: &str =
    r#"id, email, phone, name, "_id", createdby, modifiedby, is_sent, sent_at"#;

/// Columns selected for a batch run
pub const RUN_COLUMNS: &str = "batch_id, total_records, success_count, fail_count, status, \
     error_message, started_at, completed_at";

/// Row of the `pending_records` table
#[derive(Debug, Clone)]
pub struct PgRecordRow {
    pub id: i64,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub correlation_id: String,
    pub created_by: String,
    pub modified_by: String,
    pub is_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl PgRecordRow {
    /// Read a row selected with [`RECORD_COLUMNS`]
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: try_get(row, "id")?,
            email: try_get(row, "email")?,
            phone: try_get(row, "phone")?,
            name: try_get(row, "name")?,
            correlation_id: try_get(row, "_id")?,
            created_by: try_get(row, "createdby")?,
            modified_by: try_get(row, "modifiedby")?,
            is_sent: try_get(row, "is_sent")?,
            sent_at: try_get(row, "sent_at")?,
        })
    }

    pub fn into_domain(self) -> PendingRecord {
        PendingRecord {
            id: self.id,
            email: self.email,
            phone: self.phone,
            name: self.name,
            correlation_id: self.correlation_id,
            created_by: self.created_by,
            modified_by: self.modified_by,
            sent: self.is_sent,
            sent_at: self.sent_at,
        }
    }
}

/// Row of the `batch_log` table
#[derive(Debug, Clone)]
pub struct PgRunRow {
    pub batch_id: String,
    pub total_records: i64,
    pub success_count: i64,
    pub fail_count: i64,
    pub status: String,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PgRunRow {
    /// Convert a domain run into its row form
    pub fn from_domain(run: &BatchRun) -> Result<Self> {
        Ok(Self {
            batch_id: run.batch_id.to_string(),
            total_records: to_bigint(run.total_records, "total_records")?,
            success_count: to_bigint(run.success_count, "success_count")?,
            fail_count: to_bigint(run.fail_count, "fail_count")?,
            status: run.status.as_str().to_string(),
            error_message: run.error_message.clone(),
            started_at: run.started_at,
            completed_at: run.completed_at,
        })
    }

    /// Read a row selected with [`RUN_COLUMNS`]
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            batch_id: try_get(row, "batch_id")?,
            total_records: try_get(row, "total_records")?,
            success_count: try_get(row, "success_count")?,
            fail_count: try_get(row, "fail_count")?,
            status: try_get(row, "status")?,
            error_message: try_get(row, "error_message")?,
            started_at: try_get(row, "started_at")?,
            completed_at: try_get(row, "completed_at")?,
        })
    }

    /// Convert to a domain run
    pub fn into_domain(self) -> Result<BatchRun> {
        Ok(BatchRun {
            batch_id: RunId::new(self.batch_id).map_err(RelayError::Validation)?,
            total_records: from_bigint(self.total_records, "total_records")?,
            success_count: from_bigint(self.success_count, "success_count")?,
            fail_count: from_bigint(self.fail_count, "fail_count")?,
            status: self.status.parse::<RunStatus>()?,
            error_message: self.error_message,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

fn try_get<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|e| RelayError::Database(format!("Failed to read column {column}: {e}")))
}

fn to_bigint(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| RelayError::Validation(format!("{field} does not fit in BIGINT: {value}")))
}

fn from_bigint(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| RelayError::Database(format!("{field} is negative in batch_log: {value}")))
}
