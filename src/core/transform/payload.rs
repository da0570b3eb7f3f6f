//! AEP streaming payload types
//!
//! Typed mirror of the XDM envelope accepted by the AEP streaming collection endpoint. Field
//! names on the wire are camelCase except for the XDM-reserved `_id` and the tenant-scoped
//! `TEST_ID` / `TEST_NAME` attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content type of full XDM records
pub const XDM_CONTENT_TYPE: &str = "application/vnd.adobe.xed-full+json;version=1";

/// One record ready to be posted to AEP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AepPayload {
    pub header: PayloadHeader,
    pub body: PayloadBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRef {
    pub id: String,
    pub content_type: String,
}

impl SchemaRef {
    /// Reference to a full XDM schema
    pub fn xdm(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: XDM_CONTENT_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadHeader {
    pub schema_ref: SchemaRef,
    pub ims_org_id: String,
    pub dataset_id: String,
    pub source: PayloadSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSource {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadBody {
    pub xdm_meta: XdmMeta,
    pub xdm_entity: XdmEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XdmMeta {
    pub schema_ref: SchemaRef,
}

/// The profile entity
///
/// The tenant block is keyed by the tenant key (for example `_acme`) and sits next to `_id`
/// and `identityMap` at the same level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XdmEntity {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "identityMap")]
    pub identity_map: IdentityMap,

    #[serde(flatten)]
    pub tenant: BTreeMap<String, TenantEntity>,
}

/// Identity namespaces; both carry the correlation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMap {
    #[serde(rename = "crmId")]
    pub crm_id: Vec<Identity>,
    pub id: Vec<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntity {
    #[serde(rename = "TEST_ID")]
    pub test_id: i64,

    #[serde(rename = "TEST_NAME")]
    pub test_name: String,

    pub identification: Identification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub core: CoreIdentification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreIdentification {
    pub email: String,
    pub phone_number: String,
    pub crm_id: String,
}
