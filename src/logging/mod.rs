//! Logging and observability
//!
//! Structured logging through `tracing`, with console output and an optional JSON rolling
//! file. The macros below keep the field names of run events consistent between the runner,
//! the HTTP handlers and the CLI.
//!
//! ```no_run
//! use aep_relay::logging::init_logging;
//! use aep_relay::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! tracing::info!("Relay started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch run
///
/// ```no_run
/// use aep_relay::log_run_start;
/// use aep_relay::domain::RunId;
///
/// let batch_id = RunId::generate();
/// log_run_start!(&batch_id, 5);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($batch_id:expr, $total:expr) => {
        tracing::info!(
            batch_id = %$batch_id,
            total_records = $total,
            "Starting batch run"
        );
    };
}

/// Log the completion of a batch run
///
/// ```no_run
/// use aep_relay::log_run_complete;
/// use aep_relay::domain::{RunId, RunStatus};
/// use std::time::Duration;
///
/// let batch_id = RunId::generate();
/// log_run_complete!(&batch_id, RunStatus::Partial, 2, 1, Duration::from_millis(340));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($batch_id:expr, $status:expr, $success:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            batch_id = %$batch_id,
            status = %$status,
            success_count = $success,
            fail_count = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Batch run completed"
        );
    };
}

/// Log a record that could not be delivered
///
/// ```no_run
/// use aep_relay::log_record_failure;
///
/// log_record_failure!("batch_1a2b3c4d", 2, "HTTP 500");
/// ```
#[macro_export]
macro_rules! log_record_failure {
    ($batch_id:expr, $record_id:expr, $error:expr) => {
        tracing::warn!(
            batch_id = %$batch_id,
            record_id = $record_id,
            error = %$error,
            "Record delivery failed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use aep_relay::log_error_with_context;
/// use aep_relay::domain::RelayError;
///
/// let error = RelayError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
