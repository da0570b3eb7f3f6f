//! Integration tests for the daily job's HTTP trigger

use aep_relay::cli::commands::daily::trigger_run;
use aep_relay::cli::commands::{EXIT_PARTIAL, EXIT_RUN_FAILED, EXIT_SUCCESS};
use aep_relay::domain::RunStatus;
use serde_json::json;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_completed_run() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/batch/run/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "completed",
                "batch_id": "batch_1a2b3c4d",
                "total_records": 5,
                "success_count": 5,
                "fail_count": 0,
                "batch_status": "SUCCESS"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/api/batch/run/", server.url());
    let response = trigger_run(&url, TIMEOUT).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.batch_status(), Some(RunStatus::Success));
    assert_eq!(response.body["batch_id"], "batch_1a2b3c4d");
    assert_eq!(response.exit_code(), EXIT_SUCCESS);
}

#[tokio::test]
async fn test_partial_run() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/batch/run/")
        .with_status(200)
        .with_body(
            json!({
                "status": "completed",
                "batch_id": "batch_1a2b3c4d",
                "total_records": 3,
                "success_count": 2,
                "fail_count": 1,
                "batch_status": "PARTIAL",
                "errors": [{"record_id": 2, "error": "HTTP 500"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let url = format!("{}/api/batch/run/", server.url());
    let response = trigger_run(&url, TIMEOUT).await.unwrap();

    assert_eq!(response.exit_code(), EXIT_PARTIAL);
}

#[tokio::test]
async fn test_rejected_and_denied_runs() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/busy/")
        .with_status(409)
        .with_body(r#"{"status":"rejected","error":"Run already in progress"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/denied/")
        .with_status(403)
        .with_body(r#"{"error":"Access denied"}"#)
        .create_async()
        .await;

    let busy = trigger_run(&format!("{}/busy/", server.url()), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(busy.status_code, 409);
    assert_eq!(busy.exit_code(), EXIT_RUN_FAILED);

    let denied = trigger_run(&format!("{}/denied/", server.url()), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(denied.body["error"], "Access denied");
    assert_eq!(denied.exit_code(), EXIT_RUN_FAILED);
}

#[tokio::test]
async fn test_non_json_body_is_kept() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/batch/run/")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let url = format!("{}/api/batch/run/", server.url());
    let response = trigger_run(&url, TIMEOUT).await.unwrap();

    assert_eq!(response.body, json!("Bad Gateway"));
    assert_eq!(response.exit_code(), EXIT_RUN_FAILED);
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    let result = trigger_run("http://127.0.0.1:1/api/batch/run/", TIMEOUT).await;
    assert!(result.is_err());
}
