//! MCP Request Handlers
//!
//! Handler modules for the MCP methods and the FL Studio tools.
//!
//! Tool handlers never surface bridge or validation failures as JSON-RPC
//! errors. They return a payload with `success: false`, a `message` and an
//! `error_type` tag instead. Only unreadable arguments become `-32602`.

pub mod channels;
pub mod connection;
pub mod initialize;
pub mod mixer;
pub mod music;
pub mod tools;
pub mod transport;

use crate::error::{BridgeError, Result};
use crate::mcp::types::MCPError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

/// Deserialize tool arguments; a missing arguments object counts as `{}`
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> std::result::Result<T, MCPError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| MCPError::invalid_params(format!("Invalid parameters: {}", e)))
}

/// Failure payload for a tool
pub(crate) fn failure(error: &BridgeError) -> Value {
    json!({
        "success": false,
        "message": format!("Error: {}", error),
        "error_type": error.kind(),
    })
}

/// Collapse a tool body into its payload
pub(crate) fn payload(tool: &str, result: Result<Value>) -> Value {
    result.unwrap_or_else(|e| {
        warn!("⚠️  Tool '{}' failed: {}", tool, e);
        failure(&e)
    })
}

/// Pick the message for an accessor outcome
pub(crate) fn outcome(ok: bool, done: impl Into<String>, failed: &str) -> String {
    if ok {
        done.into()
    } else {
        failed.to_string()
    }
}
