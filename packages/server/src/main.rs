//! FL Studio MCP Server
//!
//! Stdio MCP server that lets AI agents drive a running FL Studio instance.
//!
//! # Configuration
//!
//! - `FLAPI_REQUEST_PORT` / `FLAPI_RESPONSE_PORT`: MIDI port names
//!   (default `Flapi Request` / `Flapi Response`)
//! - `FL_AUTO_CONNECT`: connect on the first tool call (`true`/`false`)
//! - `FLAPI_TIMEOUT_MS`: per-request timeout in milliseconds (default 5000)
//! - `RUST_LOG`: log filter, logs go to stderr
//!
//! # Host side
//!
//! FL Studio answers requests through the bundled device script
//! (`device_flstudio_mcp.py`). Write it out with
//! `fl-check --print-host-script` and install it as a MIDI controller script
//! on the request/response port pair.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --features midi-io --bin flstudio-mcp
//! ```
//!
//! MIDI support is behind the `midi-io` feature and off by default. A build
//! without it serves the MCP protocol and the offline music tools, but every
//! connect attempt fails with `dependency_unavailable`.

use flstudio_mcp_core::{
    run_mcp_server, ConnectionConfig, ConnectionManager, McpServices, MidiTransport,
    HOST_SCRIPT_NAME,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flstudio_mcp=info,flstudio_mcp_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConnectionConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!(
        "🎹 Starting FL Studio MCP server (ports: {}, {}, auto-connect: {}, timeout: {:?})",
        config.request_port, config.response_port, config.auto_connect, config.timeout
    );

    if !MidiTransport::backend_compiled() {
        warn!("⚠️  Built without the `midi-io` feature: FL Studio connections will fail. Rebuild with `--features midi-io`.");
    } else {
        info!(
            "🎛️  Expecting the {} device script on '{}'",
            HOST_SCRIPT_NAME, config.request_port
        );
    }

    let connection = Arc::new(ConnectionManager::with_transport(
        Arc::new(MidiTransport::new()),
        config,
    ));

    if connection.config().auto_connect {
        if let Err(e) = connection.connect().await {
            warn!("⚠️  Initial connection failed, will retry on first tool call: {}", e);
        }
    }

    let services = McpServices::new(connection.clone());
    let result = run_mcp_server(services).await;

    connection.disconnect().await;
    info!("👋 FL Studio MCP server shut down");
    result
}
