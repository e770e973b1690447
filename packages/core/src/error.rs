//! Bridge Error Types
//!
//! One error enum shared by the validators, the remote-execution bridge and the
//! connection manager. Every variant maps to a stable `type` tag that is written
//! into failure envelopes, so callers can branch on the tag without ever seeing
//! a Rust type.

use serde_json::Value;
use thiserror::Error;

/// Failure conditions raised anywhere between a tool call and the host.
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// Connect attempt failed (host unreachable, channel misconfigured)
    #[error("{message}")]
    ConnectionFailed { message: String },

    /// An operation that needs a live connection ran while disconnected
    #[error("{message}")]
    NotConnected { message: String },

    /// The host accepted the request but evaluating it failed
    #[error("{message}")]
    RemoteExecution { message: String, component: String },

    /// Caller input failed validation
    #[error("{message}")]
    InvalidParameter {
        message: String,
        parameter_name: String,
        parameter_value: Value,
    },

    /// The remote-execution dependency could not be loaded or initialized
    #[error("{message}")]
    DependencyUnavailable { message: String },

    /// A named MIDI port required by the channel does not exist
    #[error("{message}")]
    PortNotFound { message: String, port_name: String },

    /// Anything not covered above; keeps the envelope contract intact
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create a connection failure
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create a not-connected error with the standard message
    pub fn not_connected() -> Self {
        Self::NotConnected {
            message: "Not connected to FL Studio. Call connect() first.".to_string(),
        }
    }

    /// Create a remote execution failure attributed to `component`
    pub fn remote_execution(message: impl Into<String>, component: impl Into<String>) -> Self {
        Self::RemoteExecution {
            message: message.into(),
            component: component.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        message: impl Into<String>,
        parameter_name: impl Into<String>,
        parameter_value: impl Into<Value>,
    ) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            parameter_name: parameter_name.into(),
            parameter_value: parameter_value.into(),
        }
    }

    /// Create a dependency unavailable error
    pub fn dependency_unavailable(message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            message: message.into(),
        }
    }

    /// Create a port not found error
    pub fn port_not_found(port_name: impl Into<String>) -> Self {
        let port_name = port_name.into();
        Self::PortNotFound {
            message: format!("MIDI port not found: '{}'", port_name),
            port_name,
        }
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Stable tag written into the `type` field of failure envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailed { .. } => "connection_error",
            Self::NotConnected { .. } => "not_connected",
            Self::RemoteExecution { .. } => "remote_execution_error",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
            Self::PortNotFound { .. } => "port_not_found",
            Self::Unexpected { .. } => "unexpected_error",
        }
    }

    /// Name of the offending parameter, for `InvalidParameter`
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { parameter_name, .. } => Some(parameter_name.as_str()),
            _ => None,
        }
    }

    /// Offending value, for `InvalidParameter`
    pub fn parameter_value(&self) -> Option<&Value> {
        match self {
            Self::InvalidParameter {
                parameter_value, ..
            } => Some(parameter_value),
            _ => None,
        }
    }

    /// Subsystem that raised a `RemoteExecution` failure
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::RemoteExecution { component, .. } => Some(component.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::unexpected(format!("JSON serialization failed: {}", e))
    }
}
