//! HTTP trigger and query surface
//!
//! An actix-web server exposing the batch API under `/api/batch`. All workers share one
//! [`AppState`], and through it one [`BatchRunner`](crate::core::runner::BatchRunner).

pub mod allow_list;
pub mod handlers;
pub mod routes;
pub mod state;

pub use allow_list::AllowList;
pub use routes::{configure_routes, API_SCOPE};
pub use state::AppState;

use crate::domain::{RelayError, Result};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tokio::sync::watch;

/// Build the application for a given state
///
/// Used by [`run_server`] and by tests driving the app through `actix_web::test`.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(Logger::default())
        .configure(configure_routes)
}

/// Serve the batch API until the server stops or `shutdown` flips to `true`
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let workers = state.config.server.workers;

    tracing::info!(
        address = %bind_addr,
        workers = workers,
        allowed_peers = state.allow_list.len(),
        "Starting batch API server"
    );

    let data = web::Data::new(state);
    let server = HttpServer::new(move || build_app(data.clone()))
        .workers(workers)
        .disable_signals()
        .bind(&bind_addr)
        .map_err(|e| RelayError::Io(format!("Failed to bind {bind_addr}: {e}")))?
        .run();

    let handle = server.handle();
    tokio::spawn(async move {
        while shutdown.changed().await.is_ok() {
            if *shutdown.borrow() {
                tracing::info!("Stopping batch API server");
                handle.stop(true).await;
                break;
            }
        }
    });

    server
        .await
        .map_err(|e| RelayError::Io(format!("Server error: {e}")))?;

    tracing::info!("Batch API server stopped");
    Ok(())
}
