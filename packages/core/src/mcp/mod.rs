//! Model Context Protocol (MCP) Integration
//!
//! Stdio JSON-RPC 2.0 server exposing FL Studio remote-control tools to AI
//! agents.
//!
//! # Usage
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "tools/call",
//!   "params": {
//!     "name": "set_mixer_fader",
//!     "arguments": { "track_id": 1, "volume": 0.7 }
//!   }
//! }
//! ```

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{run_mcp_server, serve, McpServices};
pub use types::{MCPError, MCPRequest, MCPResponse};
