//! Pending customer records
//!
//! A [`PendingRecord`] is a row of the `pending_records` table. Records are created by the
//! generator and only ever mutated by the batch runner, which flips `sent` after a confirmed
//! delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer record waiting to be forwarded to AEP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Monotonic record identifier
    pub id: i64,

    /// Contact email
    pub email: String,

    /// Contact phone number (E.164-like)
    pub phone: String,

    /// Display name
    pub name: String,

    /// External correlation id, unique per record. Stored in the `_id` column.
    #[serde(rename = "_id")]
    pub correlation_id: String,

    /// Creation timestamp as written by the generator
    #[serde(rename = "createdby")]
    pub created_by: String,

    /// Last modification timestamp as written by the generator
    #[serde(rename = "modifiedby")]
    pub modified_by: String,

    /// Whether the record has been delivered
    #[serde(default)]
    pub sent: bool,

    /// When the record was marked as delivered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl PendingRecord {
    /// Create a new unsent record
    pub fn new(
        id: i64,
        email: impl Into<String>,
        phone: impl Into<String>,
        name: impl Into<String>,
        correlation_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let timestamp = timestamp.into();
        Self {
            id,
            email: email.into(),
            phone: phone.into(),
            name: name.into(),
            correlation_id: correlation_id.into(),
            created_by: timestamp.clone(),
            modified_by: timestamp,
            sent: false,
            sent_at: None,
        }
    }

    /// Mark the record as delivered at the given time
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.sent = true;
        self.sent_at = Some(at);
    }
}

/// Record totals reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Number of records in the store
    pub total_records: u64,

    /// Number of records not yet delivered
    pub unsent_records: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PendingRecord {
        PendingRecord::new(
            7,
            "test00001@gmail.com",
            "+821100000001",
            "woo7",
            "woo7251017",
            "2025-10-17T09:00:00",
        )
    }

    #[test]
    fn test_new_record_is_unsent() {
        let record = record();
        assert!(!record.sent);
        assert!(record.sent_at.is_none());
        assert_eq!(record.created_by, record.modified_by);
    }

    #[test]
    fn test_mark_sent() {
        let mut record = record();
        let now = Utc::now();
        record.mark_sent(now);
        assert!(record.sent);
        assert_eq!(record.sent_at, Some(now));
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["_id"], "woo7251017");
        assert_eq!(value["createdby"], "2025-10-17T09:00:00");
        assert!(value.get("sent_at").is_none());
    }
}
