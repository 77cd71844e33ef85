//! Session snapshots for saving and restoring an editing session.
//!
//! A snapshot wraps the policy model together with the form values of
//! variants that are not currently active, so switching back to them after a
//! reload restores what the user typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SnapshotError;
use crate::policy::{GroupType, KioskPolicy};

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Form values kept for inactive account and single-app variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuxiliaryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<GroupType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaged_app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_file_path: Option<String>,
}

impl AuxiliaryFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub model: KioskPolicy,
    #[serde(default)]
    pub auxiliary: AuxiliaryFields,
}

/// A saved editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub schema_version: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
    pub payload: SnapshotPayload,
}

impl SessionSnapshot {
    /// Capture the given state, stamped with the current time.
    pub fn new(name: impl Into<String>, model: KioskPolicy, auxiliary: AuxiliaryFields) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            saved_at: Utc::now(),
            payload: SnapshotPayload { model, auxiliary },
        }
    }

    /// Serialize the snapshot to pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, checking the envelope before the payload.
    ///
    /// # Errors
    /// Returns an error if the text is not JSON, the schema version is
    /// missing or unsupported, or the payload is missing or malformed.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json)?;
        match value.get("schemaVersion") {
            None | Some(Value::Null) => return Err(SnapshotError::MissingVersion),
            Some(version) if version.as_u64() != Some(SCHEMA_VERSION) => {
                return Err(SnapshotError::UnsupportedVersion(version.to_string()));
            }
            Some(_) => {}
        }
        match value.get("payload") {
            None | Some(Value::Null) => return Err(SnapshotError::MissingPayload),
            Some(_) => {}
        }
        Ok(serde_json::from_value(value)?)
    }
}
