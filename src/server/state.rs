//! Application state shared across HTTP handlers

use crate::adapters::store::Stores;
use crate::config::RelayConfig;
use crate::core::runner::BatchRunner;
use crate::core::transform::PayloadTransformer;
use crate::server::allow_list::AllowList;
use std::sync::Arc;

/// HTTP server state
///
/// Cloned into every actix worker. The runner is shared, so its single-run gate covers all
/// workers in the process.
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration (read-only)
    pub config: Arc<RelayConfig>,
    /// Record store and run log
    pub stores: Stores,
    /// The process-wide batch runner
    pub runner: Arc<BatchRunner>,
    /// Transformer for the payload preview
    pub transformer: PayloadTransformer,
    /// Peers allowed to trigger a run
    pub allow_list: Arc<AllowList>,
}

impl AppState {
    pub fn new(config: RelayConfig, stores: Stores, runner: Arc<BatchRunner>) -> Self {
        let transformer = PayloadTransformer::new(&config.aep);
        let allow_list = AllowList::from_entries(&config.server.allowed_ips);

        Self {
            config: Arc::new(config),
            stores,
            runner,
            transformer,
            allow_list: Arc::new(allow_list),
        }
    }
}
