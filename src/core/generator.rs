//! Placeholder record generator
//!
//! Seeds the record table with test customers so the daily job has something to deliver.
//! Ids continue from the highest id in the store. Every id ending in 0 or 5 gets the canary
//! contact, whose inbox is watched to confirm end-to-end delivery; the others get sequential
//! test accounts numbered after the existing `test*` emails.

use crate::adapters::store::RecordStore;
use crate::config::GeneratorConfig;
use crate::domain::{PendingRecord, Result};
use chrono::NaiveDateTime;

const TEST_EMAIL_PREFIX: &str = "test";

/// Where numbering starts for the next batch of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedCursor {
    /// Highest existing record id, 0 for an empty store
    pub last_id: i64,

    /// Number of existing `test*` accounts
    pub test_accounts: u64,
}

impl SeedCursor {
    /// Read the cursor from the store
    pub async fn load(store: &(dyn RecordStore + Send + Sync)) -> Result<Self> {
        Ok(Self {
            last_id: store.last_record_id().await?.unwrap_or(0),
            test_accounts: store.count_email_prefix(TEST_EMAIL_PREFIX).await?,
        })
    }
}

fn is_canary_id(id: i64) -> bool {
    matches!(id % 10, 0 | 5)
}

/// Build `count` records continuing from `cursor`
///
/// ```
/// use aep_relay::config::GeneratorConfig;
/// use aep_relay::core::generator::{plan_records, SeedCursor};
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let cursor = SeedCursor { last_id: 3, test_accounts: 2 };
/// let records = plan_records(cursor, 2, now, &GeneratorConfig::default());
///
/// assert_eq!(records[0].id, 4);
/// assert_eq!(records[0].email, "test00003@gmail.com");
/// assert_eq!(records[1].id, 5);
/// assert_eq!(records[1].correlation_id, "woo5251017");
/// ```
pub fn plan_records(
    cursor: SeedCursor,
    count: usize,
    now: NaiveDateTime,
    config: &GeneratorConfig,
) -> Vec<PendingRecord> {
    let timestamp = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    let date = now.format("%y%m%d").to_string();
    let mut test_accounts = cursor.test_accounts;

    (1..=count as i64)
        .map(|offset| {
            let id = cursor.last_id + offset;
            let (email, phone) = if is_canary_id(id) {
                (config.canary_email.clone(), config.canary_phone.clone())
            } else {
                test_accounts += 1;
                (
                    format!(
                        "{TEST_EMAIL_PREFIX}{test_accounts:05}@{}",
                        config.test_email_domain
                    ),
                    format!("+8211{test_accounts:08}"),
                )
            };

            PendingRecord::new(
                id,
                email,
                phone,
                format!("{}{id}", config.name_prefix),
                format!("{}{id}{date}", config.name_prefix),
                timestamp.clone(),
            )
        })
        .collect()
}

/// Generate and insert `count` records
///
/// # Errors
///
/// Returns an error if the store cannot be read or the insert fails.
pub async fn seed(
    store: &(dyn RecordStore + Send + Sync),
    config: &GeneratorConfig,
    count: usize,
    now: NaiveDateTime,
) -> Result<Vec<PendingRecord>> {
    let cursor = SeedCursor::load(store).await?;
    let records = plan_records(cursor, count, now, config);
    store.insert_records(&records).await?;

    tracing::info!(
        last_id = cursor.last_id,
        created = records.len(),
        "Seeded pending records"
    );
    Ok(records)
}
