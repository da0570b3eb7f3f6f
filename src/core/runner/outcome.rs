//! Run results
//!
//! [`RecordTally`] accumulates per-record results while a run folds over its records.
//! [`RunOutcome`] and [`RunFailure`] are what callers of the runner get back.

use crate::domain::{BatchRun, RelayError, RunErrorEntry, RunId, RunStatus};
use serde::Serialize;

/// Message reported when a run finds nothing to deliver
pub const NO_RECORDS_MESSAGE: &str = "No unsent records to process";

/// Per-record results of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTally {
    /// Ids of delivered records, in processing order
    pub sent_ids: Vec<i64>,

    /// Records that failed, in processing order
    pub errors: Vec<RunErrorEntry>,
}

impl RecordTally {
    pub fn add_success(&mut self, record_id: i64) {
        self.sent_ids.push(record_id);
    }

    pub fn add_failure(&mut self, record_id: i64, error: impl Into<String>) {
        self.errors.push(RunErrorEntry::new(record_id, error));
    }

    pub fn success_count(&self) -> u64 {
        self.sent_ids.len() as u64
    }

    pub fn fail_count(&self) -> u64 {
        self.errors.len() as u64
    }

    pub fn processed(&self) -> u64 {
        self.success_count() + self.fail_count()
    }
}

/// Result of a run that reached a per-record rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub batch_id: RunId,
    pub total_records: u64,
    pub success_count: u64,
    pub fail_count: u64,
    pub batch_status: RunStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<RunErrorEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunOutcome {
    /// Build the outcome of a finalized run
    pub fn from_run(run: &BatchRun, errors: Vec<RunErrorEntry>, message: Option<String>) -> Self {
        Self {
            batch_id: run.batch_id.clone(),
            total_records: run.total_records,
            success_count: run.success_count,
            fail_count: run.fail_count,
            batch_status: run.status,
            errors: if errors.is_empty() { None } else { Some(errors) },
            message,
        }
    }

    /// Everything was delivered
    pub fn is_success(&self) -> bool {
        self.batch_status == RunStatus::Success
    }

    /// Share of records delivered, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 100.0;
        }
        (self.success_count as f64 / self.total_records as f64) * 100.0
    }
}

/// A run that did not reach a per-record rollup
///
/// `batch_id` is `None` when no run record was created, which happens when another run holds
/// the gate or the run log rejected the insert.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    pub batch_id: Option<RunId>,
    pub error: RelayError,
}

impl RunFailure {
    /// Failure before any run record existed
    pub fn rejected(error: RelayError) -> Self {
        Self {
            batch_id: None,
            error,
        }
    }

    /// Failure of a logged run, which has been finalized as `FAILED`
    pub fn failed(batch_id: RunId, error: RelayError) -> Self {
        Self {
            batch_id: Some(batch_id),
            error,
        }
    }

    /// Another run was already executing
    pub fn is_overlap(&self) -> bool {
        matches!(self.error, RelayError::RunInProgress(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_tally_counts() {
        let mut tally = RecordTally::default();
        tally.add_success(1);
        tally.add_failure(2, "HTTP 500");
        tally.add_success(3);

        assert_eq!(tally.sent_ids, vec![1, 3]);
        assert_eq!(tally.success_count(), 2);
        assert_eq!(tally.fail_count(), 1);
        assert_eq!(tally.processed(), 3);
    }

    #[test]
    fn test_outcome_serialization_omits_empty_fields() {
        let mut run = BatchRun::start(RunId::new("batch_0badf00d").unwrap());
        run.complete(0, &[], Utc::now()).unwrap();

        let outcome = RunOutcome::from_run(&run, Vec::new(), None);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["batch_status"], "SUCCESS");
        assert!(json.get("errors").is_none());
        assert!(json.get("message").is_none());
        assert_eq!(outcome.success_rate(), 100.0);
    }

    #[test]
    fn test_failure_kinds() {
        let overlap = RunFailure::rejected(RelayError::RunInProgress("busy".to_string()));
        assert!(overlap.is_overlap());
        assert!(overlap.batch_id.is_none());

        let failed = RunFailure::failed(
            RunId::new("batch_0badf00d").unwrap(),
            RelayError::Database("down".to_string()),
        );
        assert!(!failed.is_overlap());
        assert!(failed.to_string().contains("down"));
    }
}
