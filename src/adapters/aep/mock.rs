//! Mock sender for development

use crate::adapters::aep::sender::{AepSender, SendOutcome};
use crate::core::transform::AepPayload;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Body returned for every mocked delivery
pub const MOCK_RESPONSE: &str = "MOCK MODE: Data not actually sent to AEP";

/// Sender that accepts every payload without network I/O
#[derive(Debug, Default)]
pub struct MockSender {
    sent: AtomicU64,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads "sent" so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AepSender for MockSender {
    async fn send(&self, payload: &AepPayload) -> SendOutcome {
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            correlation_id = %payload.body.xdm_entity.id,
            "Mock mode: payload not sent to AEP"
        );
        SendOutcome::accepted(200, MOCK_RESPONSE)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AepConfig;
    use crate::core::transform::{sample_record, PayloadTransformer};

    #[tokio::test]
    async fn test_mock_always_succeeds() {
        let config = AepConfig {
            tenant_id: "acme".to_string(),
            ..Default::default()
        };
        let payload = PayloadTransformer::new(&config)
            .to_payload(&sample_record())
            .unwrap();

        let sender = MockSender::new();
        let outcome = sender.send(&payload).await;

        assert!(outcome.success);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.response_body.as_deref(), Some(MOCK_RESPONSE));
        assert_eq!(sender.sent_count(), 1);
    }
}
