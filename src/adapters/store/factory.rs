//! Store factory
//!
//! Builds the record store and run log selected by `database_target`.

use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::traits::{RecordStore, RunLog};
use crate::config::schema::{DatabaseTarget, RelayConfig};
use crate::domain::{RelayError, Result};
use std::sync::Arc;

/// Record store and run log sharing one backend
#[derive(Clone)]
pub struct Stores {
    /// Pending record access
    pub records: Arc<dyn RecordStore + Send + Sync>,

    /// Run log access
    pub runs: Arc<dyn RunLog + Send + Sync>,
}

impl Stores {
    /// Wrap a single backend that implements both traits
    pub fn from_backend<T>(backend: Arc<T>) -> Self
    where
        T: RecordStore + RunLog + Send + Sync + 'static,
    {
        Self {
            records: backend.clone() as Arc<dyn RecordStore + Send + Sync>,
            runs: backend as Arc<dyn RunLog + Send + Sync>,
        }
    }
}

/// Create the record store and run log from the configuration
///
/// For PostgreSQL this opens the pool, tests the connection and applies the schema.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or the schema cannot be applied.
pub async fn create_stores(config: &RelayConfig) -> Result<Stores> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                RelayError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL record store and run log");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            client.test_connection().await?;
            client.ensure_schema().await?;

            Ok(Stores::from_backend(Arc::new(PostgreSQLAdapter::new(
                client,
            ))))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using the in-memory store; records and runs are lost on exit");
            Ok(Stores::from_backend(Arc::new(MemoryStore::new())))
        }
    }
}
