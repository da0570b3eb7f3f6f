//! Batch runner
//!
//! A run is a single linear pass:
//!
//! 1. Create a `RUNNING` entry in the run log
//! 2. Fetch every unsent record, ordered by id
//! 3. For each record: transform, then send (one attempt, no retry)
//! 4. Flag the delivered records as sent in one bulk update
//! 5. Roll the counts up into `SUCCESS`, `FAILED` or `PARTIAL` and finalize the log entry
//!
//! A failing record is counted and the loop moves on. A failing store operation ends the run,
//! which is then finalized as `FAILED`.
//!
//! # Delivery guarantee
//!
//! The bulk flag update runs after all sends and is not atomic with them. If the process dies
//! between a successful send and the flag update, the record is sent again by the next run.
//! AEP must deduplicate on the correlation id (`_id` and the identity map).
//!
//! # Example
//!
//! ```rust,no_run
//! use aep_relay::adapters::aep::create_sender;
//! use aep_relay::adapters::store::create_stores;
//! use aep_relay::config::load_config;
//! use aep_relay::core::runner::BatchRunner;
//! use aep_relay::core::transform::PayloadTransformer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("relay.toml")?;
//! let stores = create_stores(&config).await?;
//! let sender = create_sender(&config.aep)?;
//! let runner = BatchRunner::from_stores(&stores, sender, PayloadTransformer::new(&config.aep));
//!
//! match runner.run().await {
//!     Ok(outcome) => println!("{}: {}", outcome.batch_id, outcome.batch_status),
//!     Err(failure) => eprintln!("run failed: {failure}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod outcome;

pub use batch::BatchRunner;
pub use outcome::{RecordTally, RunFailure, RunOutcome, NO_RECORDS_MESSAGE};
