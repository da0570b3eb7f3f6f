//! External system integrations.
//!
//! - [`store`] - record store and run log traits, plus the backend factory
//! - [`postgresql`] - PostgreSQL implementation of the store traits
//! - [`memory`] - process-local implementation of the store traits
//! - [`aep`] - AEP streaming endpoint sender (live and mock)
//!
//! Adapters isolate external dependencies behind traits so the batch runner can be exercised
//! against the memory store and a mock HTTP server.

pub mod aep;
pub mod memory;
pub mod postgresql;
pub mod store;
