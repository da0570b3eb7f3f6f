//! Process-local store
//!
//! [`MemoryStore`] keeps records and runs behind a `tokio::sync::RwLock`. It backs
//! `database_target = "memory"` for local development and is the store used by the test
//! suite, which can make `fetch_unsent` or `mark_sent` fail on demand.

use crate::adapters::store::traits::{RecordStore, RunLog};
use crate::domain::{BatchRun, PendingRecord, RecordCounts, RelayError, Result, RunId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    records: BTreeMap<i64, PendingRecord>,
    runs: Vec<BatchRun>,
}

/// In-memory record store and run log
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    fail_fetch: AtomicBool,
    fail_mark_sent: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = PendingRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            inner: RwLock::new(Inner {
                records,
                runs: Vec::new(),
            }),
            ..Self::default()
        }
    }

    /// Make subsequent `fetch_unsent` calls fail
    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `mark_sent` calls fail
    pub fn fail_mark_sent(&self, fail: bool) {
        self.fail_mark_sent.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of one record
    pub async fn record(&self, id: i64) -> Option<PendingRecord> {
        self.inner.read().await.records.get(&id).cloned()
    }

    /// Snapshot of every run, in creation order
    pub async fn runs(&self) -> Vec<BatchRun> {
        self.inner.read().await.runs.clone()
    }
}

fn newest_first(runs: &[BatchRun]) -> Vec<BatchRun> {
    let mut sorted = runs.to_vec();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sorted
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_unsent(&self) -> Result<Vec<PendingRecord>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RelayError::Database(
                "Record store unavailable (injected fault)".to_string(),
            ));
        }

        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|record| !record.sent)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, ids: &[i64], at: DateTime<Utc>) -> Result<u64> {
        if self.fail_mark_sent.load(Ordering::SeqCst) {
            return Err(RelayError::Database(
                "Record store unavailable (injected fault)".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(record) = inner.records.get_mut(id) {
                if !record.sent {
                    record.mark_sent(at);
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }

    async fn counts(&self) -> Result<RecordCounts> {
        let inner = self.inner.read().await;
        let total = inner.records.len() as u64;
        let unsent = inner.records.values().filter(|r| !r.sent).count() as u64;
        Ok(RecordCounts {
            total_records: total,
            unsent_records: unsent,
        })
    }

    async fn insert_records(&self, records: &[PendingRecord]) -> Result<u64> {
        let mut inner = self.inner.write().await;

        if let Some(dup) = records.iter().find(|r| inner.records.contains_key(&r.id)) {
            return Err(RelayError::Database(format!(
                "Record {} already exists",
                dup.id
            )));
        }

        for record in records {
            inner.records.insert(record.id, record.clone());
        }
        Ok(records.len() as u64)
    }

    async fn last_record_id(&self) -> Result<Option<i64>> {
        Ok(self.inner.read().await.records.keys().next_back().copied())
    }

    async fn count_email_prefix(&self, prefix: &str) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| r.email.starts_with(prefix))
            .count() as u64)
    }
}

#[async_trait]
impl RunLog for MemoryStore {
    async fn create_run(&self, run: &BatchRun) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.runs.iter().any(|r| r.batch_id == run.batch_id) {
            return Err(RelayError::Database(format!(
                "Run {} already exists",
                run.batch_id
            )));
        }
        inner.runs.push(run.clone());
        Ok(())
    }

    async fn finalize_run(&self, run: &BatchRun) -> Result<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .runs
            .iter_mut()
            .find(|r| r.batch_id == run.batch_id)
            .ok_or_else(|| RelayError::NotFound(format!("Run {} not found", run.batch_id)))?;

        if stored.status.is_terminal() {
            return Err(RelayError::State(format!(
                "Run {} is already finalized as {}",
                run.batch_id, stored.status
            )));
        }

        *stored = run.clone();
        Ok(())
    }

    async fn get_run(&self, batch_id: &RunId) -> Result<Option<BatchRun>> {
        let inner = self.inner.read().await;
        Ok(inner.runs.iter().find(|r| &r.batch_id == batch_id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<BatchRun>> {
        let inner = self.inner.read().await;
        let mut runs = newest_first(&inner.runs);
        runs.truncate(limit);
        Ok(runs)
    }

    async fn count_runs(&self) -> Result<u64> {
        Ok(self.inner.read().await.runs.len() as u64)
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<BatchRun>> {
        let inner = self.inner.read().await;
        Ok(newest_first(&inner.runs)
            .into_iter()
            .filter(|r| r.started_at >= since)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunStatus;

    fn record(id: i64) -> PendingRecord {
        PendingRecord::new(
            id,
            format!("test{id:05}@gmail.com"),
            format!("+8211{id:08}"),
            format!("woo{id}"),
            format!("woo{id}251017"),
            "2025-10-17T09:00:00",
        )
    }

    #[tokio::test]
    async fn test_fetch_unsent_ordered_by_id() {
        let store = MemoryStore::with_records([record(3), record(1), record(2)]);
        let ids: Vec<i64> = store
            .fetch_unsent()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_mark_sent_only_touches_unsent() {
        let store = MemoryStore::with_records([record(1), record(2)]);
        let now = Utc::now();

        assert_eq!(store.mark_sent(&[1, 99], now).await.unwrap(), 1);
        assert_eq!(store.mark_sent(&[1], now).await.unwrap(), 0);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.total_records, 2);
        assert_eq!(counts.unsent_records, 1);
        assert_eq!(store.record(1).await.unwrap().sent_at, Some(now));
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = MemoryStore::with_records([record(1)]);
        store.fail_fetch(true);
        assert!(matches!(
            store.fetch_unsent().await,
            Err(RelayError::Database(_))
        ));
        store.fail_fetch(false);
        assert!(store.fetch_unsent().await.is_ok());

        store.fail_mark_sent(true);
        assert!(store.mark_sent(&[1], Utc::now()).await.is_err());
        assert!(!store.record(1).await.unwrap().sent);
    }

    #[tokio::test]
    async fn test_generator_queries() {
        let store = MemoryStore::new();
        assert_eq!(store.last_record_id().await.unwrap(), None);

        store.insert_records(&[record(4), record(7)]).await.unwrap();
        assert_eq!(store.last_record_id().await.unwrap(), Some(7));
        assert_eq!(store.count_email_prefix("test").await.unwrap(), 2);
        assert_eq!(store.count_email_prefix("canary").await.unwrap(), 0);

        assert!(store.insert_records(&[record(7)]).await.is_err());
    }

    #[tokio::test]
    async fn test_finalize_refuses_terminal_run() {
        let store = MemoryStore::new();
        let mut run = BatchRun::start(RunId::generate());
        store.create_run(&run).await.unwrap();

        run.complete(0, &[], Utc::now()).unwrap();
        store.finalize_run(&run).await.unwrap();

        let mut late = run.clone();
        late.status = RunStatus::Failed;
        assert!(matches!(
            store.finalize_run(&late).await,
            Err(RelayError::State(_))
        ));

        let stored = store.get_run(&run.batch_id).await.unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Success);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = MemoryStore::new();
        let mut first = BatchRun::start(RunId::new("batch_00000001").unwrap());
        first.started_at = Utc::now() - chrono::Duration::minutes(5);
        let second = BatchRun::start(RunId::new("batch_00000002").unwrap());

        store.create_run(&first).await.unwrap();
        store.create_run(&second).await.unwrap();

        let runs = store.list_recent(10).await.unwrap();
        assert_eq!(runs[0].batch_id, second.batch_id);
        assert_eq!(store.list_recent(1).await.unwrap().len(), 1);
        assert_eq!(store.count_runs().await.unwrap(), 2);

        let since = Utc::now() - chrono::Duration::minutes(1);
        assert_eq!(store.list_since(since).await.unwrap().len(), 1);
        assert!(store
            .get_run(&RunId::new("batch_ffffffff").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
