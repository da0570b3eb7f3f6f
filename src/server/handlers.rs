//! HTTP request handlers
//!
//! Every handler answers with a JSON body. Error bodies use an `error` field.

use crate::core::runner::RunOutcome;
use crate::core::transform::sample_record;
use crate::domain::{BatchRun, RelayError, RunId, RunStatus};
use crate::server::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default page size of the run list
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Largest page size of the run list
pub const MAX_LIST_LIMIT: usize = 100;

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "Batch API";

/// One run as shown by the query endpoints
#[derive(Debug, Serialize)]
pub struct RunView {
    pub batch_id: RunId,
    pub status: RunStatus,
    pub total_records: u64,
    pub success_count: u64,
    pub fail_count: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Only present on the detail endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Option<String>>,
}

impl RunView {
    fn summary(run: BatchRun) -> Self {
        Self {
            batch_id: run.batch_id,
            status: run.status,
            total_records: run.total_records,
            success_count: run.success_count,
            fail_count: run.fail_count,
            started_at: run.started_at,
            completed_at: run.completed_at,
            error_message: None,
        }
    }

    fn detail(run: BatchRun) -> Self {
        let error_message = Some(run.error_message.clone());
        Self {
            error_message,
            ..Self::summary(run)
        }
    }
}

#[derive(Serialize)]
struct CompletedRun<'a> {
    status: &'static str,
    #[serde(flatten)]
    outcome: &'a RunOutcome,
}

/// Query parameters of the run list
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Requested page size clamped to `1..=MAX_LIST_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// GET /api/batch/health/
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    match state.stores.records.counts().await {
        Ok(counts) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "timestamp": timestamp(),
            "service": SERVICE_NAME,
            "database": counts,
        })),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not read record counts");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "timestamp": timestamp(),
                "service": SERVICE_NAME,
                "error": e.to_string(),
            }))
        }
    }
}

/// POST /api/batch/run/
///
/// Blocks until the run finishes.
pub async fn run_batch(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let peer = req.peer_addr().map(|addr| addr.ip());
    let permitted = peer.is_some_and(|ip| state.allow_list.permits(ip));

    if !permitted {
        tracing::warn!(
            peer = ?peer,
            "Batch run trigger denied for peer outside the allow-list"
        );
        return HttpResponse::Forbidden().json(json!({ "error": "Access denied" }));
    }

    match state.runner.run().await {
        Ok(outcome) => HttpResponse::Ok().json(CompletedRun {
            status: "completed",
            outcome: &outcome,
        }),
        Err(failure) if failure.is_overlap() => HttpResponse::Conflict().json(json!({
            "status": "rejected",
            "error": failure.error.to_string(),
        })),
        Err(failure) => HttpResponse::InternalServerError().json(json!({
            "status": "failed",
            "batch_id": failure.batch_id,
            "error": failure.error.to_string(),
        })),
    }
}

/// GET /api/batch/status/{batch_id}/
pub async fn batch_status(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let not_found = || HttpResponse::NotFound().json(json!({ "error": "Batch not found" }));

    // A malformed id cannot name a stored run
    let Ok(batch_id) = RunId::new(path.into_inner()) else {
        return not_found();
    };

    match state.stores.runs.get_run(&batch_id).await {
        Ok(Some(run)) => HttpResponse::Ok().json(RunView::detail(run)),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!(batch_id = %batch_id, error = %e, "Failed to load run");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

/// GET /api/batch/list/?limit=N
pub async fn batch_list(query: web::Query<ListQuery>, state: web::Data<AppState>) -> HttpResponse {
    let limit = query.effective_limit();

    let listing = async {
        let runs = state.stores.runs.list_recent(limit).await?;
        let total = state.stores.runs.count_runs().await?;
        Ok::<_, RelayError>((runs, total))
    };

    match listing.await {
        Ok((runs, total)) => {
            let batches: Vec<RunView> = runs.into_iter().map(RunView::summary).collect();
            HttpResponse::Ok().json(json!({ "total": total, "batches": batches }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list runs");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

/// POST /api/batch/test-payload/
///
/// Transforms a synthetic record. Neither the store nor the sender is touched.
pub async fn test_payload(state: web::Data<AppState>) -> HttpResponse {
    let record = sample_record();

    match state.transformer.to_payload(&record) {
        Ok(payload) => HttpResponse::Ok().json(json!({
            "status": "success",
            "sample_record": record,
            "aep_payload": payload,
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "status": "failed",
            "error": e.to_string(),
        })),
    }
}
