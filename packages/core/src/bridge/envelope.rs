//! Uniform Result Envelope
//!
//! Every remote evaluation made through `safe_execute` ends in one of these.
//! On the wire it is `{"success": true, "data": ...}` or
//! `{"success": false, "error": "...", "type": "<tag>"}`.

use crate::error::BridgeError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success { data: Value },
    Failure { error: String, kind: String },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    pub fn failure(error: &BridgeError) -> Self {
        Self::Failure {
            error: error.to_string(),
            kind: error.kind().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Payload of a successful evaluation
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Error message of a failed evaluation
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error, .. } => Some(error.as_str()),
            Self::Success { .. } => None,
        }
    }

    /// Error tag of a failed evaluation
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Failure { kind, .. } => Some(kind.as_str()),
            Self::Success { .. } => None,
        }
    }
}

impl From<BridgeError> for Envelope {
    fn from(error: BridgeError) -> Self {
        Self::failure(&error)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
                map.end()
            }
            Self::Failure { error, kind } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("type", kind)?;
                map.end()
            }
        }
    }
}
