//! FL Studio MCP Core
//!
//! Remote control of a running FL Studio instance for AI agents. Tool calls
//! arrive over MCP, are validated, and are evaluated inside the host through
//! a MIDI SysEx channel answered by the bundled FL Studio device script.
//!
//! # Modules
//!
//! - [`error`] - Error taxonomy shared by every layer
//! - [`validation`] - Parameter validators and color conversion
//! - [`utils`] - MIDI note, scale and chord helpers
//! - [`bridge`] - Remote execution bridge, wire protocol and transports
//! - [`connection`] - Configuration and connection lifecycle
//! - [`api`] - Typed accessors for transport, channels and mixer
//! - [`mcp`] - MCP stdio server and tool handlers

pub mod api;
pub mod bridge;
pub mod connection;
pub mod error;
pub mod mcp;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use api::{ChannelApi, ChannelInfo, MixerApi, TrackLevels, TransportApi, TransportStatus};
pub use bridge::{
    ConnectionInfo, Envelope, FlStudioBridge, MidiTransport, Transport, HOST_SCRIPT,
    HOST_SCRIPT_NAME,
};
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionStatus};
pub use error::{BridgeError, Result};
pub use mcp::{run_mcp_server, McpServices};
