//! Route table for the batch API

use crate::server::handlers::{batch_list, batch_status, health_check, run_batch, test_payload};
use actix_web::web;

/// Path prefix shared by every endpoint
pub const API_SCOPE: &str = "/api/batch";

/// Register the batch API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_SCOPE)
            .route("/health/", web::get().to(health_check))
            .route("/run/", web::post().to(run_batch))
            .route("/status/{batch_id}/", web::get().to(batch_status))
            .route("/list/", web::get().to(batch_list))
            .route("/test-payload/", web::post().to(test_payload)),
    );
}
