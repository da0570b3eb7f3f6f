//! Store abstraction layer
//!
//! Trait-based access to the record table and the run log, allowing the relay to run against
//! PostgreSQL or the process-local memory store.

pub mod factory;
pub mod traits;

pub use factory::{create_stores, Stores};
pub use traits::{RecordStore, RunLog};
