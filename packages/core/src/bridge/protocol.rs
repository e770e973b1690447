//! Remote Evaluation Wire Protocol
//!
//! Requests are structured values, never spliced source strings. A request is a
//! correlation id plus an [`Expression`]; the host answers with a
//! [`RemoteReply`] carrying the same id.
//!
//! # Framing
//!
//! Messages travel as JSON inside a MIDI SysEx frame:
//!
//! ```text
//! F0 7D 46 4C <8-to-7 packed JSON> F7
//! ```
//!
//! `7D` is the non-commercial manufacturer id and `46 4C` ("FL") tags frames
//! as ours. SysEx payload bytes must keep the high bit clear, so every run of
//! seven payload bytes is preceded by one byte holding their high bits.
//!
//! The FL Studio end is [`HOST_SCRIPT`], a MIDI device script installed as
//! `Settings/Hardware/FL Studio MCP/device_flstudio_mcp.py`.

use crate::error::{BridgeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

pub const PROTOCOL_VERSION: u8 = 1;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

/// Manufacturer id followed by the "FL" tag
pub const FRAME_HEADER: [u8; 3] = [0x7D, 0x46, 0x4C];

/// File name FL Studio expects for the device script on the host side
pub const HOST_SCRIPT_NAME: &str = "device_flstudio_mcp.py";

/// Host-side device script that answers these frames inside FL Studio
pub const HOST_SCRIPT: &str = include_str!("../../host/device_flstudio_mcp.py");

/// A call into one of the host's scripting modules, e.g. `transport.start()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RemoteCall {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// What the host should evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Expression {
    /// Structured module call
    Call(RemoteCall),

    /// Raw host expression. Only used for probes and diagnostics.
    Eval { source: String },
}

impl Expression {
    pub fn eval(source: impl Into<String>) -> Self {
        Self::Eval {
            source: source.into(),
        }
    }
}

impl From<RemoteCall> for Expression {
    fn from(call: RemoteCall) -> Self {
        Self::Call(call)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call(call) => {
                write!(f, "{}.{}(", call.module, call.function)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Self::Eval { source } => f.write_str(source),
        }
    }
}

/// Request frame body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub v: u8,
    pub id: Uuid,
    pub expr: Expression,
}

impl RemoteRequest {
    /// Wrap an expression with a fresh correlation id
    pub fn new(expr: Expression) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            id: Uuid::new_v4(),
            expr,
        }
    }
}

/// Reply frame body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteReply {
    pub id: Uuid,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Host module that raised the error, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl RemoteReply {
    pub fn success(id: Uuid, value: Value) -> Self {
        Self {
            id,
            ok: true,
            value,
            error: None,
            component: None,
        }
    }

    pub fn failure(id: Uuid, error: impl Into<String>, component: Option<String>) -> Self {
        Self {
            id,
            ok: false,
            value: Value::Null,
            error: Some(error.into()),
            component,
        }
    }

    /// Turn the reply into the evaluation result
    pub fn into_result(self) -> Result<Value> {
        if self.ok {
            return Ok(self.value);
        }
        let message = self
            .error
            .unwrap_or_else(|| "Remote evaluation failed".to_string());
        Err(BridgeError::remote_execution(
            message,
            self.component.unwrap_or_else(|| "executor".to_string()),
        ))
    }
}

/// Pack arbitrary bytes into a 7-bit clean SysEx frame
pub fn encode_sysex(payload: &[u8]) -> Vec<u8> {
    let packed_len = payload.len() + payload.len().div_ceil(7);
    let mut frame = Vec::with_capacity(packed_len + FRAME_HEADER.len() + 2);

    frame.push(SYSEX_START);
    frame.extend_from_slice(&FRAME_HEADER);

    for chunk in payload.chunks(7) {
        let high_bits = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, byte)| acc | ((byte >> 7) << i));
        frame.push(high_bits);
        frame.extend(chunk.iter().map(|byte| byte & 0x7F));
    }

    frame.push(SYSEX_END);
    frame
}

/// Unpack a SysEx frame produced by [`encode_sysex`].
///
/// Returns `None` for frames that are not ours or are malformed.
pub fn decode_sysex(frame: &[u8]) -> Option<Vec<u8>> {
    let body = frame
        .strip_prefix(&[SYSEX_START])?
        .strip_suffix(&[SYSEX_END])?
        .strip_prefix(&FRAME_HEADER)?;

    if body.iter().any(|byte| byte & 0x80 != 0) {
        return None;
    }

    let mut payload = Vec::with_capacity(body.len());
    for group in body.chunks(8) {
        let (high_bits, data) = group.split_first()?;
        if data.is_empty() {
            return None;
        }
        payload.extend(
            data.iter()
                .enumerate()
                .map(|(i, byte)| byte | (((high_bits >> i) & 1) << 7)),
        );
    }
    Some(payload)
}

/// Serialize a message and frame it
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(message)?;
    Ok(encode_sysex(&json))
}

/// Unframe and deserialize a message.
///
/// `Ok(None)` means the frame belongs to someone else and should be ignored.
pub fn decode_frame<T: DeserializeOwned>(frame: &[u8]) -> Result<Option<T>> {
    match decode_sysex(frame) {
        Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
        None => Ok(None),
    }
}

/// Match a received frame against the in-flight request.
///
/// `None` means keep waiting: the frame is foreign, stale or malformed.
pub fn accept_reply(frame: &[u8], id: Uuid) -> Option<Result<Value>> {
    match decode_frame::<RemoteReply>(frame) {
        Ok(Some(reply)) if reply.id == id => Some(reply.into_result()),
        Ok(Some(reply)) => {
            debug!("Discarding stale reply {}", reply.id);
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Discarding malformed reply frame: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;
