//! Core business logic.
//!
//! - [`transform`] - record to AEP payload mapping
//! - [`runner`] - the batch runner and its outcome types
//! - [`generator`] - placeholder record generation for the daily job
//! - [`report`] - run history selection and rendering

pub mod generator;
pub mod report;
pub mod runner;
pub mod transform;
