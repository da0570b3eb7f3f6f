//! Identifier newtypes with validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RUN_ID_PREFIX: &str = "batch_";

/// Batch run identifier
///
/// Format: `batch_` followed by the first eight hex characters of a v4 UUID.
///
/// # Examples
///
/// ```
/// use aep_relay::domain::ids::RunId;
/// use std::str::FromStr;
///
/// let run_id = RunId::from_str("batch_1a2b3c4d").unwrap();
/// assert_eq!(run_id.as_str(), "batch_1a2b3c4d");
///
/// let fresh = RunId::generate();
/// assert!(fresh.as_str().starts_with("batch_"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    /// Creates a RunId from an existing identifier string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Run ID cannot be empty".to_string());
        }
        if id.len() > 100 {
            return Err(format!("Run ID exceeds 100 characters: {id}"));
        }
        Ok(Self(id))
    }

    /// Generates a fresh identifier
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{RUN_ID_PREFIX}{}", &hex[..8]))
    }

    /// Returns the run ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RunId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
