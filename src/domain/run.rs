//! Batch run log entries
//!
//! A [`BatchRun`] is created in the `RUNNING` state when a run starts and is finalized exactly
//! once into `SUCCESS`, `FAILED` or `PARTIAL`. Terminal runs are never modified again.

use crate::domain::ids::RunId;
use crate::domain::{RelayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    /// Run is executing
    Running,
    /// Every record was delivered (or there was nothing to deliver)
    Success,
    /// No record was delivered, or the run itself failed
    Failed,
    /// Some records were delivered and some failed
    Partial,
}

impl RunStatus {
    /// Roll per-record counts up into a terminal status
    ///
    /// ```
    /// use aep_relay::domain::run::RunStatus;
    ///
    /// assert_eq!(RunStatus::from_counts(0, 0), RunStatus::Success);
    /// assert_eq!(RunStatus::from_counts(3, 0), RunStatus::Success);
    /// assert_eq!(RunStatus::from_counts(0, 3), RunStatus::Failed);
    /// assert_eq!(RunStatus::from_counts(2, 1), RunStatus::Partial);
    /// ```
    pub fn from_counts(success_count: u64, fail_count: u64) -> Self {
        if fail_count == 0 {
            Self::Success
        } else if success_count == 0 {
            Self::Failed
        } else {
            Self::Partial
        }
    }

    /// Whether no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Stored/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Partial => "PARTIAL",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "PARTIAL" => Ok(Self::Partial),
            _ => Err(RelayError::Validation(format!("Unknown run status: {s}"))),
        }
    }
}

/// A single record that could not be delivered during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunErrorEntry {
    /// Record identifier
    pub record_id: i64,

    /// Transform or send error
    pub error: String,
}

impl RunErrorEntry {
    /// Create a new error entry
    pub fn new(record_id: i64, error: impl Into<String>) -> Self {
        Self {
            record_id,
            error: error.into(),
        }
    }
}

/// One execution of the batch runner, as stored in the `batch_log` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRun {
    /// Unique run identifier
    pub batch_id: RunId,

    /// Number of unsent records fetched at the start of the run
    pub total_records: u64,

    /// Records delivered
    pub success_count: u64,

    /// Records that failed
    pub fail_count: u64,

    /// Current status
    pub status: RunStatus,

    /// JSON list of `{record_id, error}` entries, or a run-level failure message
    pub error_message: Option<String>,

    /// When the run was created
    pub started_at: DateTime<Utc>,

    /// When the run was finalized
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchRun {
    /// Start a new run in the `RUNNING` state
    pub fn start(batch_id: RunId) -> Self {
        Self {
            batch_id,
            total_records: 0,
            success_count: 0,
            fail_count: 0,
            status: RunStatus::Running,
            error_message: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Finalize the run from per-record results
    ///
    /// The error list is serialized into `error_message` when it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::State`] if the run is already terminal or the counts do not add
    /// up to `total_records`.
    pub fn complete(
        &mut self,
        success_count: u64,
        errors: &[RunErrorEntry],
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_running()?;

        let fail_count = errors.len() as u64;
        if success_count + fail_count != self.total_records {
            return Err(RelayError::State(format!(
                "Run {} counts do not add up: {} + {} != {}",
                self.batch_id, success_count, fail_count, self.total_records
            )));
        }

        self.success_count = success_count;
        self.fail_count = fail_count;
        self.status = RunStatus::from_counts(success_count, fail_count);
        self.error_message = if errors.is_empty() {
            None
        } else {
            Some(serde_json::to_string(errors)?)
        };
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Finalize the run as `FAILED` after a run-level error
    ///
    /// No record of the run was flagged as delivered, so every fetched record counts as
    /// failed.
    pub fn fail(&mut self, message: impl Into<String>, completed_at: DateTime<Utc>) -> Result<()> {
        let total = self.total_records;
        self.fail_with_counts(0, total, message, completed_at)
    }

    /// Finalize the run as `FAILED` while keeping the per-record counts
    ///
    /// Used when delivered records were already flagged before the run-level error.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::State`] if the run is already terminal or the counts do not add
    /// up to `total_records`.
    pub fn fail_with_counts(
        &mut self,
        success_count: u64,
        fail_count: u64,
        message: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_running()?;

        if success_count + fail_count != self.total_records {
            return Err(RelayError::State(format!(
                "Run {} counts do not add up: {} + {} != {}",
                self.batch_id, success_count, fail_count, self.total_records
            )));
        }

        self.success_count = success_count;
        self.fail_count = fail_count;
        self.status = RunStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Parse `error_message` back into per-record entries, if it holds a list
    pub fn record_errors(&self) -> Option<Vec<RunErrorEntry>> {
        self.error_message
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(RelayError::State(format!(
                "Run {} is already finalized as {}",
                self.batch_id, self.status
            )));
        }
        Ok(())
    }
}
