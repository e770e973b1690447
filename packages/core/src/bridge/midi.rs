//! MIDI SysEx Transport
//!
//! Talks to the host's remote-execution script over a pair of virtual MIDI
//! ports. Requests go out on the request port, replies come back on the
//! response port. Both directions carry framed JSON (see
//! [`crate::bridge::protocol`]).
//!
//! Hardware access needs the `midi-io` feature. Without it the transport
//! still exists but reports its dependency as unavailable, so connect attempts
//! fail with `DependencyUnavailable` instead of failing to build.

#![cfg_attr(not(feature = "midi-io"), allow(unused_imports, dead_code))]

use crate::bridge::protocol::{self, RemoteRequest};
use crate::bridge::transport::{find_port, RemoteSession, Transport};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

#[cfg(feature = "midi-io")]
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
#[cfg(feature = "midi-io")]
use tokio::sync::mpsc;

#[cfg(not(feature = "midi-io"))]
const MISSING_BACKEND: &str =
    "MIDI support is not compiled in. Rebuild flstudio-mcp with `--features midi-io`.";

/// Transport over two virtual MIDI ports
#[derive(Debug, Clone)]
pub struct MidiTransport {
    client_name: String,
}

impl MidiTransport {
    pub fn new() -> Self {
        Self {
            client_name: "flstudio-mcp".to_string(),
        }
    }

    /// Whether this build can reach real MIDI ports
    pub const fn backend_compiled() -> bool {
        cfg!(feature = "midi-io")
    }
}

impl Default for MidiTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MidiTransport {
    fn name(&self) -> &str {
        "midi-sysex"
    }

    fn version(&self) -> Option<String> {
        if cfg!(feature = "midi-io") {
            Some(format!("sysex-v{}", protocol::PROTOCOL_VERSION))
        } else {
            None
        }
    }

    #[cfg(feature = "midi-io")]
    fn probe(&self) -> Result<()> {
        MidiInput::new(&self.client_name)
            .map(|_| ())
            .map_err(|e| {
                BridgeError::dependency_unavailable(format!("MIDI backend unavailable: {}", e))
            })
    }

    #[cfg(not(feature = "midi-io"))]
    fn probe(&self) -> Result<()> {
        Err(BridgeError::dependency_unavailable(MISSING_BACKEND))
    }

    #[cfg(feature = "midi-io")]
    async fn open(
        &self,
        request_port: &str,
        response_port: &str,
    ) -> Result<Box<dyn RemoteSession>> {
        let session = MidiSession::open(&self.client_name, request_port, response_port)?;
        info!(
            "🎹 Opened MIDI session (request='{}', response='{}')",
            request_port, response_port
        );
        Ok(Box::new(session))
    }

    #[cfg(not(feature = "midi-io"))]
    async fn open(
        &self,
        _request_port: &str,
        _response_port: &str,
    ) -> Result<Box<dyn RemoteSession>> {
        Err(BridgeError::dependency_unavailable(MISSING_BACKEND))
    }
}

#[cfg(feature = "midi-io")]
struct MidiSession {
    output: Option<MidiOutputConnection>,
    input: Option<MidiInputConnection<()>>,
    replies: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[cfg(feature = "midi-io")]
impl MidiSession {
    fn open(client_name: &str, request_port: &str, response_port: &str) -> Result<Self> {
        let output = MidiOutput::new(client_name).map_err(|e| {
            BridgeError::connection_failed(format!("Failed to create MIDI output: {}", e))
        })?;
        let out_ports = output.ports();
        let out_names: Vec<String> = out_ports
            .iter()
            .map(|port| output.port_name(port).unwrap_or_default())
            .collect();
        debug!("MIDI outputs: {:?}", out_names);
        let out_port = find_port(&out_names, request_port)
            .and_then(|index| out_ports.get(index))
            .ok_or_else(|| BridgeError::port_not_found(request_port))?
            .clone();

        let mut input = MidiInput::new(client_name).map_err(|e| {
            BridgeError::connection_failed(format!("Failed to create MIDI input: {}", e))
        })?;
        // SysEx is filtered out by default
        input.ignore(Ignore::None);
        let in_ports = input.ports();
        let in_names: Vec<String> = in_ports
            .iter()
            .map(|port| input.port_name(port).unwrap_or_default())
            .collect();
        debug!("MIDI inputs: {:?}", in_names);
        let in_port = find_port(&in_names, response_port)
            .and_then(|index| in_ports.get(index))
            .ok_or_else(|| BridgeError::port_not_found(response_port))?
            .clone();

        let (tx, replies) = mpsc::unbounded_channel();
        let input = input
            .connect(
                &in_port,
                "flstudio-mcp-response",
                move |_timestamp, message, _| {
                    if message.first() == Some(&protocol::SYSEX_START) {
                        let _ = tx.send(message.to_vec());
                    }
                },
                (),
            )
            .map_err(|e| {
                BridgeError::connection_failed(format!(
                    "Failed to open response port '{}': {}",
                    response_port, e
                ))
            })?;

        let output = output
            .connect(&out_port, "flstudio-mcp-request")
            .map_err(|e| {
                BridgeError::connection_failed(format!(
                    "Failed to open request port '{}': {}",
                    request_port, e
                ))
            })?;

        Ok(Self {
            output: Some(output),
            input: Some(input),
            replies,
        })
    }
}

#[cfg(feature = "midi-io")]
#[async_trait]
impl RemoteSession for MidiSession {
    async fn evaluate(&mut self, request: &RemoteRequest) -> Result<Value> {
        // Leftovers from requests that timed out
        while self.replies.try_recv().is_ok() {}

        let frame = protocol::encode_frame(request)?;
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| BridgeError::remote_execution("Request port is closed", "midi"))?;
        output.send(&frame).map_err(|e| {
            BridgeError::remote_execution(format!("Failed to send request: {}", e), "midi")
        })?;

        loop {
            let frame = self
                .replies
                .recv()
                .await
                .ok_or_else(|| BridgeError::remote_execution("Response port closed", "midi"))?;

            if let Some(result) = protocol::accept_reply(&frame, request.id) {
                return result;
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(output) = self.output.take() {
            output.close();
        }
        if let Some(input) = self.input.take() {
            input.close();
        }
        Ok(())
    }
}
