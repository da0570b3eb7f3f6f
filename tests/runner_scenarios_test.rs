//! End-to-end batch run scenarios
//!
//! Runs the batch runner over the memory store with the live sender pointed at a mock AEP
//! endpoint, or with test senders where timing matters.

use aep_relay::adapters::aep::{AepSender, LiveSender, MockSender, SendOutcome};
use aep_relay::adapters::memory::MemoryStore;
use aep_relay::adapters::store::{RecordStore, Stores};
use aep_relay::config::AepConfig;
use aep_relay::core::runner::{BatchRunner, NO_RECORDS_MESSAGE};
use aep_relay::core::transform::{AepPayload, PayloadTransformer};
use aep_relay::domain::{PendingRecord, RelayError, RunErrorEntry, RunStatus};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

fn aep_config(endpoint: String) -> AepConfig {
    AepConfig {
        mock_mode: false,
        streaming_endpoint: endpoint,
        ims_org_id: "ORG@AdobeOrg".to_string(),
        dataset_id: "dataset-1".to_string(),
        schema_id: "https://ns.adobe.com/acme/schemas/profile".to_string(),
        tenant_id: "acme".to_string(),
        source_name: "Batch API Source".to_string(),
        timeout_seconds: 2,
    }
}

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

fn runner(store: Arc<MemoryStore>, sender: Arc<dyn AepSender + Send + Sync>) -> BatchRunner {
    let config = aep_config(String::new());
    BatchRunner::from_stores(
        &Stores::from_backend(store),
        sender,
        PayloadTransformer::new(&config),
    )
}

async fn mock_aep_for(server: &mut mockito::ServerGuard, id: i64, status: usize) -> mockito::Mock {
    server
        .mock("POST", "/collection/inlet-1")
        .match_body(Matcher::PartialJson(json!({
            "body": {"xdmEntity": {"_id": format!("woo{id}251017")}}
        })))
        .with_status(status)
        .with_body(if status == 500 { "Internal Server Error" } else { "{}" })
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_partial_run_against_live_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let first = mock_aep_for(&mut server, 1, 200).await;
    let second = mock_aep_for(&mut server, 2, 500).await;
    let third = mock_aep_for(&mut server, 3, 200).await;

    let config = aep_config(format!("{}/collection/inlet-1", server.url()));
    let sender = Arc::new(LiveSender::new(&config).unwrap());

    let store = Arc::new(MemoryStore::with_records([record(1), record(2), record(3)]));
    let outcome = runner(store.clone(), sender).run().await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;

    assert_eq!(outcome.total_records, 3);
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(outcome.batch_status, RunStatus::Partial);

    let errors = outcome.errors.clone().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].record_id, 2);
    assert!(errors[0].error.contains("HTTP 500"));

    assert!(store.record(1).await.unwrap().sent);
    assert!(!store.record(2).await.unwrap().sent);
    assert!(store.record(3).await.unwrap().sent);

    let runs = store.runs().await;
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.batch_id, outcome.batch_id);
    assert_eq!(run.status, RunStatus::Partial);
    assert!(run.completed_at.is_some());
    assert_eq!(
        run.record_errors().unwrap(),
        vec![RunErrorEntry::new(2, errors[0].error.clone())]
    );
}

#[tokio::test]
async fn test_failed_record_is_retried_by_next_run() {
    let store = Arc::new(MemoryStore::with_records([record(1), record(2)]));

    let mut flaky = mockito::Server::new_async().await;
    let ok = mock_aep_for(&mut flaky, 1, 200).await;
    let failing = mock_aep_for(&mut flaky, 2, 500).await;
    let config = aep_config(format!("{}/collection/inlet-1", flaky.url()));
    let sender = Arc::new(LiveSender::new(&config).unwrap());

    let first = runner(store.clone(), sender).run().await.unwrap();
    ok.assert_async().await;
    failing.assert_async().await;
    assert_eq!(first.batch_status, RunStatus::Partial);

    let mut healthy = mockito::Server::new_async().await;
    let recovered = mock_aep_for(&mut healthy, 2, 200).await;
    let config = aep_config(format!("{}/collection/inlet-1", healthy.url()));
    let sender = Arc::new(LiveSender::new(&config).unwrap());

    let second = runner(store.clone(), sender).run().await.unwrap();
    recovered.assert_async().await;

    assert_eq!(second.total_records, 1);
    assert_eq!(second.batch_status, RunStatus::Success);
    assert_eq!(store.counts().await.unwrap().unsent_records, 0);
    assert_eq!(store.runs().await.len(), 2);
}

#[tokio::test]
async fn test_already_sent_records_are_left_alone() {
    let delivered_at = Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 0).unwrap();
    let mut delivered = record(2);
    delivered.mark_sent(delivered_at);

    let store = Arc::new(MemoryStore::with_records([record(1), delivered, record(3)]));
    let sender = Arc::new(MockSender::new());

    let outcome = runner(store.clone(), sender.clone()).run().await.unwrap();

    assert_eq!(outcome.total_records, 2);
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.batch_status, RunStatus::Success);
    assert_eq!(sender.sent_count(), 2);

    let untouched = store.record(2).await.unwrap();
    assert!(untouched.sent);
    assert_eq!(untouched.sent_at, Some(delivered_at));

    let first = store.record(1).await.unwrap();
    assert!(first.sent);
    assert_ne!(first.sent_at, Some(delivered_at));

    let run = &store.runs().await[0];
    assert_eq!(run.total_records, 2);
    assert_eq!(run.success_count + run.fail_count, run.total_records);
}

#[tokio::test]
async fn test_all_failures_finalize_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/collection/inlet-1")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let config = aep_config(format!("{}/collection/inlet-1", server.url()));
    let sender = Arc::new(LiveSender::new(&config).unwrap());
    let store = Arc::new(MemoryStore::with_records([record(1), record(2)]));

    let outcome = runner(store.clone(), sender).run().await.unwrap();

    assert_eq!(outcome.batch_status, RunStatus::Failed);
    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.fail_count, 2);
    assert_eq!(store.counts().await.unwrap().unsent_records, 2);
}

#[tokio::test]
async fn test_empty_store_is_success() {
    let store = Arc::new(MemoryStore::new());
    let sender = Arc::new(MockSender::new());

    let outcome = runner(store.clone(), sender.clone()).run().await.unwrap();

    assert_eq!(outcome.total_records, 0);
    assert_eq!(outcome.batch_status, RunStatus::Success);
    assert_eq!(outcome.message.as_deref(), Some(NO_RECORDS_MESSAGE));
    assert!(outcome.errors.is_none());
    assert_eq!(sender.sent_count(), 0);

    let runs = store.runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Success);
}

#[tokio::test]
async fn test_fetch_failure_finalizes_failed() {
    let store = Arc::new(MemoryStore::with_records([record(1)]));
    store.fail_fetch(true);

    let failure = runner(store.clone(), Arc::new(MockSender::new()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RelayError::Database(_)));
    let batch_id = failure.batch_id.expect("run was logged");

    let runs = store.runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].batch_id, batch_id);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].completed_at.is_some());
    assert!(runs[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("unavailable"));
}

#[tokio::test]
async fn test_mark_sent_failure_finalizes_failed() {
    let store = Arc::new(MemoryStore::with_records([record(1), record(2)]));
    store.fail_mark_sent(true);
    let sender = Arc::new(MockSender::new());

    let failure = runner(store.clone(), sender.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(sender.sent_count(), 2);
    assert!(failure.batch_id.is_some());

    let run = &store.runs().await[0];
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.total_records, 2);
    assert_eq!(run.success_count + run.fail_count, run.total_records);

    // Nothing was flagged, so the next run sends both again
    assert_eq!(store.counts().await.unwrap().unsent_records, 2);
}

/// Blocks inside `send` until released
struct BlockingSender {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AepSender for BlockingSender {
    async fn send(&self, _payload: &AepPayload) -> SendOutcome {
        self.entered.notify_one();
        self.release.notified().await;
        SendOutcome::accepted(200, "ok")
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

#[tokio::test]
async fn test_overlapping_run_is_rejected() {
    let store = Arc::new(MemoryStore::with_records([record(1)]));
    let sender = Arc::new(BlockingSender {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let shared = Arc::new(runner(store.clone(), sender.clone()));

    let background = shared.clone();
    let first = tokio::spawn(async move { background.run().await });
    sender.entered.notified().await;
    assert!(shared.is_busy());

    let rejected = shared.run().await.unwrap_err();
    assert!(rejected.is_overlap());
    assert!(rejected.batch_id.is_none());
    assert_eq!(store.runs().await.len(), 1);

    sender.release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.batch_status, RunStatus::Success);
    assert!(!shared.is_busy());

    // The gate is free again
    let next = shared.run().await.unwrap();
    assert_eq!(next.total_records, 0);
    assert_eq!(store.runs().await.len(), 2);
}
