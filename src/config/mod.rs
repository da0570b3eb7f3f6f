//! Configuration management for the relay.
//!
//! Settings are read from a TOML file (default `relay.toml`, overridable with `RELAY_CONFIG`)
//! with support for:
//! - `${VAR_NAME}` substitution from the process environment
//! - `RELAY_<SECTION>_<KEY>` overrides applied after parsing
//! - Defaults for every optional setting
//! - Validation before anything is started
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "development"
//! database_target = "postgresql"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! allowed_ips = ["127.0.0.1", "localhost", "::1"]
//!
//! [aep]
//! mock_mode = false
//! streaming_endpoint = "https://dcs.adobedc.net/collection/${AEP_INLET_ID}"
//! ims_org_id = "${AEP_IMS_ORG_ID}"
//! dataset_id = "${AEP_DATASET_ID}"
//! schema_id = "${AEP_SCHEMA_ID}"
//! tenant_id = "_acme"
//!
//! [postgresql]
//! connection_string = "${RELAY_DATABASE_URL}"
//! ```
//!
//! ```rust,no_run
//! use aep_relay::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("relay.toml")?;
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    AepConfig, ApplicationConfig, DatabaseTarget, Environment, GeneratorConfig, LoggingConfig,
    PostgreSQLConfig, RelayConfig, ServerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
