//! Sender trait and factory

use crate::adapters::aep::live::LiveSender;
use crate::adapters::aep::mock::MockSender;
use crate::config::AepConfig;
use crate::core::transform::AepPayload;
use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Result of one delivery attempt
///
/// A failed send is data, not an error: the runner records it against the record and moves
/// on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    /// Whether AEP accepted the payload
    pub success: bool,

    /// HTTP status, absent for transport failures
    pub status_code: Option<u16>,

    /// Response body on success
    pub response_body: Option<String>,

    /// Failure description
    pub error: Option<String>,
}

impl SendOutcome {
    /// Accepted by the endpoint
    pub fn accepted(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            response_body: Some(body.into()),
            error: None,
        }
    }

    /// Rejected with a non-success HTTP status
    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: Some(status_code),
            response_body: None,
            error: Some(body.into()),
        }
    }

    /// The request never produced a response
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            response_body: None,
            error: Some(error.into()),
        }
    }

    /// Message stored in the run's error list
    pub fn failure_message(&self) -> String {
        match (self.status_code, self.error.as_deref()) {
            (Some(code), Some(body)) if !body.is_empty() => format!("HTTP {code}: {body}"),
            (Some(code), _) => format!("HTTP {code}"),
            (None, Some(error)) => error.to_string(),
            (None, None) => "Unknown send failure".to_string(),
        }
    }
}

/// One-shot delivery of a payload to AEP
#[async_trait]
pub trait AepSender: Send + Sync {
    /// Deliver one payload. Never retries.
    async fn send(&self, payload: &AepPayload) -> SendOutcome;

    /// Short name for logs and health output
    fn name(&self) -> &'static str;
}

/// Create the sender selected by `aep.mock_mode`
///
/// # Errors
///
/// Returns an error if the live HTTP client cannot be built.
pub fn create_sender(config: &AepConfig) -> Result<Arc<dyn AepSender + Send + Sync>> {
    if config.mock_mode {
        tracing::warn!("AEP mock mode is enabled; records will not be delivered");
        Ok(Arc::new(MockSender::new()))
    } else {
        tracing::info!(endpoint = %config.streaming_endpoint, "Creating live AEP sender");
        Ok(Arc::new(LiveSender::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        assert_eq!(
            SendOutcome::rejected(500, "boom").failure_message(),
            "HTTP 500: boom"
        );
        assert_eq!(SendOutcome::rejected(400, "").failure_message(), "HTTP 400");
        assert_eq!(
            SendOutcome::transport_failure("timed out").failure_message(),
            "timed out"
        );
    }

    #[test]
    fn test_create_sender_mock() {
        let config = AepConfig::default();
        let sender = create_sender(&config).unwrap();
        assert_eq!(sender.name(), "mock");
    }

    #[test]
    fn test_create_sender_live() {
        let config = AepConfig {
            mock_mode: false,
            streaming_endpoint: "https://dcs.adobedc.net/collection/abc".to_string(),
            ims_org_id: "ORG@AdobeOrg".to_string(),
            ..Default::default()
        };
        let sender = create_sender(&config).unwrap();
        assert_eq!(sender.name(), "live");
    }
}
