//! MCP stdio Server
//!
//! Async Tokio task that handles JSON-RPC 2.0 requests over stdin/stdout.
//! Pure protocol implementation with no framework dependencies.

use crate::api::{ChannelApi, MixerApi, TransportApi};
use crate::connection::ConnectionManager;
use crate::mcp::handlers::{initialize, tools};
use crate::mcp::types::{MCPError, MCPRequest, MCPResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, instrument, warn};

/// Everything a tool handler can reach.
///
/// All accessors share the connection manager's bridge.
#[derive(Clone)]
pub struct McpServices {
    pub connection: Arc<ConnectionManager>,
    pub transport: Arc<TransportApi>,
    pub channels: Arc<ChannelApi>,
    pub mixer: Arc<MixerApi>,
}

impl McpServices {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        let bridge = connection.bridge().clone();
        Self {
            transport: Arc::new(TransportApi::new(bridge.clone())),
            channels: Arc::new(ChannelApi::new(bridge.clone())),
            mixer: Arc::new(MixerApi::new(bridge)),
            connection,
        }
    }
}

/// Run the MCP stdio server
///
/// Reads JSON-RPC requests from stdin, processes them via handlers,
/// and writes responses to stdout. Runs until EOF on stdin.
#[instrument(skip(services))]
pub async fn run_mcp_server(services: McpServices) -> anyhow::Result<()> {
    info!("🔌 MCP stdio server started");

    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve(&services, reader, writer).await?;

    info!("🔌 MCP stdio server stopped (stdin closed)");
    Ok(())
}

/// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`
pub async fn serve<R, W>(services: &McpServices, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("📥 MCP request: {}", line);

        let request: MCPRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                warn!("❌ Failed to parse JSON-RPC request: {}", e);
                let error_response = MCPResponse::error(
                    Value::Null,
                    MCPError::parse_error(format!("Invalid JSON: {}", e)),
                );
                write_response(&mut writer, &error_response).await?;
                continue;
            }
        };

        let method = request.method.clone();
        if let Some(response) = handle_request(services, request).await {
            debug!("📤 MCP response for method '{}' (id={})", method, response.id);
            write_response(&mut writer, &response).await?;
        }
    }

    Ok(())
}

/// Handle a JSON-RPC request; notifications get no response
#[instrument(skip(services, request), fields(method = %request.method))]
async fn handle_request(services: &McpServices, request: MCPRequest) -> Option<MCPResponse> {
    let Some(id) = request.id else {
        debug!("🔔 MCP notification: {}", request.method);
        return None;
    };

    if request.jsonrpc != "2.0" {
        return Some(MCPResponse::error(
            id,
            MCPError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }

    let result = match request.method.as_str() {
        "initialize" => initialize::handle_initialize(request.params),
        "ping" => Ok(json!({})),
        "tools/list" => tools::handle_tools_list(request.params),
        "tools/call" => tools::handle_tools_call(services, request.params).await,
        _ => {
            warn!("⚠️  Unknown MCP method: {}", request.method);
            Err(MCPError::method_not_found(&request.method))
        }
    };

    Some(match result {
        Ok(result) => {
            debug!("✅ MCP request {} succeeded", id);
            MCPResponse::success(id, result)
        }
        Err(error) => {
            error!(
                "❌ MCP request {} failed: {} (code: {})",
                id, error.message, error.code
            );
            MCPResponse::error(id, error)
        }
    })
}

/// Write one JSON-RPC response line and flush
async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &MCPResponse,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
