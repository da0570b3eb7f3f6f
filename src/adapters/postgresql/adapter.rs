//! PostgreSQL adapter implementing the store traits

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{PgRecordRow, PgRunRow, RECORD_COLUMNS, RUN_COLUMNS};
use crate::adapters::store::traits::{RecordStore, RunLog};
use crate::domain::{BatchRun, PendingRecord, RecordCounts, RelayError, Result, RunId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// PostgreSQL implementation of [`RecordStore`] and [`RunLog`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl RecordStore for PostgreSQLAdapter {
    async fn fetch_unsent(&self) -> Result<Vec<PendingRecord>> {
        let query =
            format!("SELECT {RECORD_COLUMNS} FROM pending_records WHERE is_sent = FALSE ORDER BY id");

        let rows = self.client.query(&query, &[]).await?;

        let records = rows
            .iter()
            .map(|row| PgRecordRow::from_row(row).map(PgRecordRow::into_domain))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = records.len(), "Fetched unsent records from PostgreSQL");
        Ok(records)
    }

    async fn mark_sent(&self, ids: &[i64], at: DateTime<Utc>) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let statement = "UPDATE pending_records SET is_sent = TRUE, sent_at = $2 \
                         WHERE id = ANY($1) AND is_sent = FALSE";

        let updated = self.client.execute(statement, &[&ids, &at]).await?;

        tracing::debug!(
            requested = ids.len(),
            updated = updated,
            "Marked records as sent in PostgreSQL"
        );
        Ok(updated)
    }

    async fn counts(&self) -> Result<RecordCounts> {
        let query = "SELECT COUNT(*) AS total, \
                     COUNT(*) FILTER (WHERE is_sent = FALSE) AS unsent \
                     FROM pending_records";

        let rows = self.client.query(query, &[]).await?;
        let row = rows
            .first()
            .ok_or_else(|| RelayError::Database("Count query returned no rows".to_string()))?;

        let total: i64 = row.get("total");
        let unsent: i64 = row.get("unsent");

        Ok(RecordCounts {
            total_records: total.max(0) as u64,
            unsent_records: unsent.max(0) as u64,
        })
    }

    async fn insert_records(&self, records: &[PendingRecord]) -> Result<u64> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| RelayError::Database(format!("Failed to start transaction: {e}")))?;

        let statement = r#"
            INSERT INTO pending_records (
                id, email, phone, name, "_id", createdby, modifiedby, is_sent, sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        let mut inserted = 0;
        for record in records {
            inserted += tx
                .execute(
                    statement,
                    &[
                        &record.id,
                        &record.email,
                        &record.phone,
                        &record.name,
                        &record.correlation_id,
                        &record.created_by,
                        &record.modified_by,
                        &record.sent,
                        &record.sent_at,
                    ],
                )
                .await
                .map_err(|e| {
                    RelayError::Database(format!("Failed to insert record {}: {e}", record.id))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| RelayError::Database(format!("Failed to commit records: {e}")))?;

        tracing::debug!(count = inserted, "Inserted records into PostgreSQL");
        Ok(inserted)
    }

    async fn last_record_id(&self) -> Result<Option<i64>> {
        let rows = self
            .client
            .query("SELECT MAX(id) AS last_id FROM pending_records", &[])
            .await?;

        Ok(rows.first().and_then(|row| row.get("last_id")))
    }

    async fn count_email_prefix(&self, prefix: &str) -> Result<u64> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows = self
            .client
            .query(
                "SELECT COUNT(*) AS n FROM pending_records WHERE email LIKE $1",
                &[&pattern],
            )
            .await?;

        let count: i64 = rows.first().map(|row| row.get("n")).unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }
}

#[async_trait]
impl RunLog for PostgreSQLAdapter {
    async fn create_run(&self, run: &BatchRun) -> Result<()> {
        let row = PgRunRow::from_domain(run)?;

        let statement = format!(
            "INSERT INTO batch_log ({RUN_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        );

        self.client
            .execute(
                &statement,
                &[
                    &row.batch_id,
                    &row.total_records,
                    &row.success_count,
                    &row.fail_count,
                    &row.status,
                    &row.error_message,
                    &row.started_at,
                    &row.completed_at,
                ],
            )
            .await?;

        tracing::debug!(batch_id = %run.batch_id, "Run created in PostgreSQL");
        Ok(())
    }

    async fn finalize_run(&self, run: &BatchRun) -> Result<()> {
        let row = PgRunRow::from_domain(run)?;

        // The status guard keeps terminal runs immutable
        let statement = "UPDATE batch_log SET total_records = $2, success_count = $3, \
                         fail_count = $4, status = $5, error_message = $6, completed_at = $7 \
                         WHERE batch_id = $1 AND status = 'RUNNING'";

        let updated = self
            .client
            .execute(
                statement,
                &[
                    &row.batch_id,
                    &row.total_records,
                    &row.success_count,
                    &row.fail_count,
                    &row.status,
                    &row.error_message,
                    &row.completed_at,
                ],
            )
            .await?;

        if updated == 0 {
            return Err(RelayError::State(format!(
                "Run {} is not RUNNING or does not exist",
                run.batch_id
            )));
        }

        tracing::debug!(batch_id = %run.batch_id, status = %run.status, "Run finalized in PostgreSQL");
        Ok(())
    }

    async fn get_run(&self, batch_id: &RunId) -> Result<Option<BatchRun>> {
        let query = format!("SELECT {RUN_COLUMNS} FROM batch_log WHERE batch_id = $1");

        match self.client.query_opt(&query, &[&batch_id.as_str()]).await? {
            Some(row) => Ok(Some(PgRunRow::from_row(&row)?.into_domain()?)),
            None => Ok(None),
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<BatchRun>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query =
            format!("SELECT {RUN_COLUMNS} FROM batch_log ORDER BY started_at DESC LIMIT $1");

        let rows = self.client.query(&query, &[&limit]).await?;
        rows.iter()
            .map(|row| PgRunRow::from_row(row)?.into_domain())
            .collect()
    }

    async fn count_runs(&self) -> Result<u64> {
        let rows = self
            .client
            .query("SELECT COUNT(*) AS n FROM batch_log", &[])
            .await?;

        let count: i64 = rows.first().map(|row| row.get("n")).unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<BatchRun>> {
        let query = format!(
            "SELECT {RUN_COLUMNS} FROM batch_log WHERE started_at >= $1 ORDER BY started_at DESC"
        );

        let rows = self.client.query(&query, &[&since]).await?;
        rows.iter()
            .map(|row| PgRunRow::from_row(row)?.into_domain())
            .collect()
    }
}

/// Escape `LIKE` metacharacters so the prefix matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
