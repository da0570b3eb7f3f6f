//! Record to AEP payload transformation
//!
//! [`PayloadTransformer`] maps a [`PendingRecord`] onto the XDM envelope in [`payload`]. The
//! mapping is pure: the same record and configuration always produce the same payload.

pub mod payload;

pub use payload::{AepPayload, XDM_CONTENT_TYPE};

use crate::config::AepConfig;
use crate::domain::{PendingRecord, RelayError, Result};
use chrono::{NaiveDate, Utc};
use payload::{
    CoreIdentification, Identification, Identity, IdentityMap, PayloadBody, PayloadHeader,
    PayloadSource, SchemaRef, TenantEntity, XdmEntity, XdmMeta,
};
use std::collections::BTreeMap;

/// Top-level `xdmEntity` fields that a tenant key must not shadow
pub const RESERVED_ENTITY_KEYS: &[&str] = &["_id", "identityMap"];

/// Normalize a tenant id into the XDM tenant key
///
/// Any number of leading or trailing underscores are stripped and exactly one is re-added,
/// so normalizing twice gives the same key.
///
/// ```
/// use aep_relay::core::transform::tenant_key;
///
/// assert_eq!(tenant_key("acme"), "_acme");
/// assert_eq!(tenant_key("__acme_"), "_acme");
/// assert_eq!(tenant_key(&tenant_key("acme")), "_acme");
/// ```
pub fn tenant_key(tenant_id: &str) -> String {
    format!("_{}", tenant_id.trim_matches('_'))
}

/// Builds AEP payloads from pending records
#[derive(Debug, Clone)]
pub struct PayloadTransformer {
    schema_id: String,
    ims_org_id: String,
    dataset_id: String,
    source_name: String,
    tenant_key: String,
}

impl PayloadTransformer {
    /// Capture the AEP identifiers from configuration
    pub fn new(config: &AepConfig) -> Self {
        Self {
            schema_id: config.schema_id.clone(),
            ims_org_id: config.ims_org_id.clone(),
            dataset_id: config.dataset_id.clone(),
            source_name: config.source_name.clone(),
            tenant_key: tenant_key(&config.tenant_id),
        }
    }

    /// Normalized tenant key, e.g. `_acme`
    pub fn tenant_key(&self) -> &str {
        &self.tenant_key
    }

    /// Build the payload for one record
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transform`] if the record has no correlation id, since AEP
    /// cannot identify the profile without it.
    pub fn to_payload(&self, record: &PendingRecord) -> Result<AepPayload> {
        let correlation_id = record.correlation_id.trim();
        if correlation_id.is_empty() {
            return Err(RelayError::Transform(format!(
                "Record {} has no correlation id",
                record.id
            )));
        }

        let tenant = TenantEntity {
            test_id: record.id,
            test_name: record.name.clone(),
            identification: Identification {
                core: CoreIdentification {
                    email: record.email.clone(),
                    phone_number: record.phone.clone(),
                    crm_id: correlation_id.to_string(),
                },
            },
        };

        Ok(AepPayload {
            header: PayloadHeader {
                schema_ref: SchemaRef::xdm(&self.schema_id),
                ims_org_id: self.ims_org_id.clone(),
                dataset_id: self.dataset_id.clone(),
                source: PayloadSource {
                    name: self.source_name.clone(),
                },
            },
            body: PayloadBody {
                xdm_meta: XdmMeta {
                    schema_ref: SchemaRef::xdm(&self.schema_id),
                },
                xdm_entity: XdmEntity {
                    id: correlation_id.to_string(),
                    identity_map: IdentityMap {
                        crm_id: vec![Identity {
                            id: correlation_id.to_string(),
                        }],
                        id: vec![Identity {
                            id: correlation_id.to_string(),
                        }],
                    },
                    tenant: BTreeMap::from([(self.tenant_key.clone(), tenant)]),
                },
            },
        })
    }
}

/// Synthetic record used by the payload preview endpoint
pub fn sample_record() -> PendingRecord {
    sample_record_on(Utc::now().date_naive())
}

/// [`sample_record`] for a fixed date
pub fn sample_record_on(date: NaiveDate) -> PendingRecord {
    let timestamp = Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    PendingRecord::new(
        999,
        "test@example.com",
        "+821012345678",
        "test_user",
        format!("test999{}", date.format("%y%m%d")),
        timestamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn config() -> AepConfig {
        AepConfig {
            mock_mode: true,
            streaming_endpoint: String::new(),
            ims_org_id: "ORG@AdobeOrg".to_string(),
            dataset_id: "dataset-1".to_string(),
            schema_id: "https://ns.adobe.com/acme/schemas/profile".to_string(),
            tenant_id: "_acme".to_string(),
            source_name: "Batch API Source".to_string(),
            timeout_seconds: 10,
        }
    }

    fn record() -> PendingRecord {
        PendingRecord::new(
            2,
            "test00002@gmail.com",
            "+821100000002",
            "woo2",
            "woo2251017",
            "2025-10-17T09:00:00",
        )
    }

    #[test_case("acme", "_acme" ; "bare")]
    #[test_case("_acme", "_acme" ; "one leading")]
    #[test_case("__acme", "_acme" ; "two leading")]
    #[test_case("acme__", "_acme" ; "trailing")]
    #[test_case("_ac_me_", "_ac_me" ; "inner underscore kept")]
    fn test_tenant_key(input: &str, expected: &str) {
        assert_eq!(tenant_key(input), expected);
        assert_eq!(tenant_key(&tenant_key(input)), expected);
    }

    #[test]
    fn test_payload_shape() {
        let transformer = PayloadTransformer::new(&config());
        let payload = transformer.to_payload(&record()).unwrap();

        let expected = json!({
            "header": {
                "schemaRef": {
                    "id": "https://ns.adobe.com/acme/schemas/profile",
                    "contentType": XDM_CONTENT_TYPE
                },
                "imsOrgId": "ORG@AdobeOrg",
                "datasetId": "dataset-1",
                "source": {"name": "Batch API Source"}
            },
            "body": {
                "xdmMeta": {
                    "schemaRef": {
                        "id": "https://ns.adobe.com/acme/schemas/profile",
                        "contentType": XDM_CONTENT_TYPE
                    }
                },
                "xdmEntity": {
                    "_id": "woo2251017",
                    "identityMap": {
                        "crmId": [{"id": "woo2251017"}],
                        "id": [{"id": "woo2251017"}]
                    },
                    "_acme": {
                        "TEST_ID": 2,
                        "TEST_NAME": "woo2",
                        "identification": {
                            "core": {
                                "email": "test00002@gmail.com",
                                "phoneNumber": "+821100000002",
                                "crmId": "woo2251017"
                            }
                        }
                    }
                }
            }
        });

        assert_eq!(serde_json::to_value(&payload).unwrap(), expected);
    }

    #[test]
    fn test_payload_is_deterministic() {
        let transformer = PayloadTransformer::new(&config());
        let first = transformer.to_payload(&record()).unwrap();
        let second = transformer.to_payload(&record()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_correlation_id_rejected() {
        let transformer = PayloadTransformer::new(&config());
        let mut record = record();
        record.correlation_id = "  ".to_string();

        let result = transformer.to_payload(&record);
        assert!(matches!(result, Err(RelayError::Transform(_))));
    }

    #[test]
    fn test_sample_record() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap();
        let sample = sample_record_on(date);
        assert_eq!(sample.id, 999);
        assert_eq!(sample.email, "test@example.com");
        assert_eq!(sample.correlation_id, "test999251017");

        let transformer = PayloadTransformer::new(&config());
        assert!(transformer.to_payload(&sample).is_ok());
    }
}
