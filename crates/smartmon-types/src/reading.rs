use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SmartError};

/// One device telemetry snapshot at one instant.
///
/// The payload is opaque to smartmon: the internal SMART attribute fields
/// are never interpreted here, only carried. The only requirement is that a
/// reading round-trips through the canonical JSON text encoding used by the
/// object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(Value);

impl Reading {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Encode to the canonical stored form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(Into::into)
    }

    /// Decode from the stored form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(bytes)
            .map_err(|e| SmartError::Serialization(format!("undecodable reading: {e}")))?;
        Ok(Self(value))
    }
}

impl From<Value> for Reading {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
