//! The batch runner

use crate::adapters::aep::AepSender;
use crate::adapters::store::{RecordStore, RunLog, Stores};
use crate::core::runner::outcome::{RecordTally, RunFailure, RunOutcome, NO_RECORDS_MESSAGE};
use crate::core::transform::PayloadTransformer;
use crate::domain::{BatchRun, PendingRecord, RelayError, Result, RunId};
use crate::{log_error_with_context, log_record_failure, log_run_complete, log_run_start};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Per-record counts of a run whose delivered records were already flagged
#[derive(Debug, Clone, Copy)]
struct FlaggedCounts {
    success: u64,
    failed: u64,
}

/// Executes batch runs: fetch, transform, send, flag, log
///
/// One runner is shared by every trigger surface in the process. Its gate lets at most one
/// run execute at a time; an overlapping trigger is rejected without creating a run record.
pub struct BatchRunner {
    records: Arc<dyn RecordStore + Send + Sync>,
    runs: Arc<dyn RunLog + Send + Sync>,
    sender: Arc<dyn AepSender + Send + Sync>,
    transformer: PayloadTransformer,
    gate: Mutex<()>,
}

impl BatchRunner {
    /// Create a runner over the given store, sender and transformer
    pub fn new(
        records: Arc<dyn RecordStore + Send + Sync>,
        runs: Arc<dyn RunLog + Send + Sync>,
        sender: Arc<dyn AepSender + Send + Sync>,
        transformer: PayloadTransformer,
    ) -> Self {
        Self {
            records,
            runs,
            sender,
            transformer,
            gate: Mutex::new(()),
        }
    }

    /// Create a runner from a [`Stores`] pair
    pub fn from_stores(
        stores: &Stores,
        sender: Arc<dyn AepSender + Send + Sync>,
        transformer: PayloadTransformer,
    ) -> Self {
        Self::new(
            stores.records.clone(),
            stores.runs.clone(),
            sender,
            transformer,
        )
    }

    /// Whether a run is executing right now
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Execute one batch run
    ///
    /// Per-record failures never abort the run; they are counted and reported in the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`RunFailure`] when another run is active, when the run record cannot be
    /// created, or when a store operation fails mid-run. In the last case the run has already
    /// been finalized as `FAILED`.
    pub async fn run(&self) -> std::result::Result<RunOutcome, RunFailure> {
        let _guard = self.gate.try_lock().map_err(|_| {
            tracing::warn!("Batch run rejected: another run is in progress");
            RunFailure::rejected(RelayError::RunInProgress(
                "another batch run is executing in this process".to_string(),
            ))
        })?;

        let started = Instant::now();
        let mut run = BatchRun::start(RunId::generate());
        self.runs
            .create_run(&run)
            .await
            .map_err(RunFailure::rejected)?;

        let mut flagged = None;
        match self.execute(&mut run, &mut flagged, started).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.abort(&mut run, flagged, &error).await;
                Err(RunFailure::failed(run.batch_id.clone(), error))
            }
        }
    }

    async fn execute(
        &self,
        run: &mut BatchRun,
        flagged: &mut Option<FlaggedCounts>,
        started: Instant,
    ) -> Result<RunOutcome> {
        let records = self.records.fetch_unsent().await?;
        run.total_records = records.len() as u64;
        log_run_start!(&run.batch_id, run.total_records);

        if records.is_empty() {
            let finished = self.finalize(run, &RecordTally::default(), flagged).await?;
            log_run_complete!(&finished.batch_id, finished.status, 0u64, 0u64, started.elapsed());
            return Ok(RunOutcome::from_run(
                &finished,
                Vec::new(),
                Some(NO_RECORDS_MESSAGE.to_string()),
            ));
        }

        let batch_id = run.batch_id.clone();
        let tally = stream::iter(records)
            .fold(RecordTally::default(), |mut tally, record| {
                let batch_id = &batch_id;
                async move {
                    match self.deliver(&record).await {
                        Ok(()) => tally.add_success(record.id),
                        Err(error) => {
                            log_record_failure!(batch_id, record.id, error);
                            tally.add_failure(record.id, error);
                        }
                    }
                    tally
                }
            })
            .await;

        let finished = self.finalize(run, &tally, flagged).await?;
        log_run_complete!(
            &finished.batch_id,
            finished.status,
            finished.success_count,
            finished.fail_count,
            started.elapsed()
        );

        Ok(RunOutcome::from_run(&finished, tally.errors, None))
    }

    /// Transform and send one record; the error is the message stored for the record
    async fn deliver(&self, record: &PendingRecord) -> std::result::Result<(), String> {
        let payload = self
            .transformer
            .to_payload(record)
            .map_err(|e| e.to_string())?;

        let outcome = self.sender.send(&payload).await;
        if outcome.success {
            tracing::debug!(
                record_id = record.id,
                status_code = outcome.status_code,
                "Record delivered"
            );
            Ok(())
        } else {
            Err(outcome.failure_message())
        }
    }

    /// Flag delivered records, then write the terminal run state
    ///
    /// The in-memory run only becomes terminal once the run log accepted it, so a failure
    /// here still leaves `run` in a state [`Self::abort`] can finalize. `flagged` is set as
    /// soon as the flag update commits.
    async fn finalize(
        &self,
        run: &mut BatchRun,
        tally: &RecordTally,
        flagged: &mut Option<FlaggedCounts>,
    ) -> Result<BatchRun> {
        let completed_at = Utc::now();

        if !tally.sent_ids.is_empty() {
            let updated = self.records.mark_sent(&tally.sent_ids, completed_at).await?;
            if updated != tally.success_count() {
                tracing::warn!(
                    batch_id = %run.batch_id,
                    expected = tally.success_count(),
                    updated = updated,
                    "Some delivered records were already flagged as sent"
                );
            }
            *flagged = Some(FlaggedCounts {
                success: tally.success_count(),
                failed: tally.fail_count(),
            });
        }

        let mut finished = run.clone();
        finished.complete(tally.success_count(), &tally.errors, completed_at)?;
        self.runs.finalize_run(&finished).await?;
        *run = finished.clone();
        Ok(finished)
    }

    /// Finalize a run as `FAILED` after a run-level error
    ///
    /// Records flagged before the error stay counted as delivered.
    async fn abort(&self, run: &mut BatchRun, flagged: Option<FlaggedCounts>, error: &RelayError) {
        log_error_with_context!(error, "Batch run failed");

        let completed_at = Utc::now();
        let marked = match flagged {
            Some(counts) => {
                run.fail_with_counts(counts.success, counts.failed, error.to_string(), completed_at)
            }
            None => run.fail(error.to_string(), completed_at),
        };
        if let Err(e) = marked {
            log_error_with_context!(&e, "Run could not be marked as failed");
            return;
        }

        if let Err(e) = self.runs.finalize_run(run).await {
            log_error_with_context!(&e, "Failed to record run failure in the run log");
        }
    }
}
