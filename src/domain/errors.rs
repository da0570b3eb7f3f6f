//! Domain error types
//!
//! This module defines the error hierarchy for the relay.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main relay error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record store or run log errors
    #[error("Database error: {0}")]
    Database(String),

    /// A record could not be mapped into the AEP payload shape
    #[error("Transform error: {0}")]
    Transform(String),

    /// Outbound call to the AEP endpoint could not be set up
    #[error("Sender error: {0}")]
    Sender(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not on the trigger allow-list
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Another batch run is already executing in this process
    #[error("A batch run is already in progress: {0}")]
    RunInProgress(String),

    /// Illegal run state transition
    #[error("State error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::Configuration(format!("TOML parse error: {err}"))
    }
}
