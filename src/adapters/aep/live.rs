//! Live sender over HTTP

use crate::adapters::aep::sender::{AepSender, SendOutcome};
use crate::config::AepConfig;
use crate::core::transform::AepPayload;
use crate::domain::{RelayError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// Header carrying the IMS organization id
pub const IMS_ORG_HEADER: &str = "x-gw-ims-org-id";

/// Sender that POSTs each payload to the streaming collection endpoint
pub struct LiveSender {
    client: Client,
    endpoint: String,
    ims_org_id: String,
}

impl LiveSender {
    /// Build the HTTP client with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Sender`] if the client cannot be built.
    pub fn new(config: &AepConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RelayError::Sender(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.streaming_endpoint.clone(),
            ims_org_id: config.ims_org_id.clone(),
        })
    }

    fn is_accepted(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
        )
    }
}

#[async_trait]
impl AepSender for LiveSender {
    async fn send(&self, payload: &AepPayload) -> SendOutcome {
        let correlation_id = &payload.body.xdm_entity.id;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                correlation_id = %correlation_id,
                payload = %serde_json::to_string(payload).unwrap_or_default(),
                "Sending payload to AEP"
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(IMS_ORG_HEADER, &self.ims_org_id)
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                let kind = if e.is_timeout() { "timeout" } else { "transport" };
                tracing::warn!(
                    correlation_id = %correlation_id,
                    kind = kind,
                    error = %e,
                    "AEP request failed"
                );
                return SendOutcome::transport_failure(format!("AEP request failed: {e}"));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        tracing::debug!(
            correlation_id = %correlation_id,
            status_code = status.as_u16(),
            "AEP response received"
        );

        if Self::is_accepted(status) {
            SendOutcome::accepted(status.as_u16(), body)
        } else {
            SendOutcome::rejected(status.as_u16(), body)
        }
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
