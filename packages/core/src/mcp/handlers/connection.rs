//! MCP Connection Tool Handlers
//!
//! connect / disconnect / status / health. These are the only tools that do
//! not require an existing connection.

use crate::error::Result;
use crate::mcp::handlers::outcome;
use crate::mcp::server::McpServices;
use serde_json::{json, Value};

pub async fn handle_connect(services: &McpServices) -> Result<Value> {
    let connection = &services.connection;
    let ok = connection.connect().await?;
    Ok(json!({
        "success": ok,
        "message": outcome(ok, "Successfully connected to FL Studio", "Failed to connect to FL Studio"),
        "connection_info": connection.connection_status(),
    }))
}

pub async fn handle_disconnect(services: &McpServices) -> Result<Value> {
    services.connection.disconnect().await;
    Ok(json!({
        "success": true,
        "message": "Disconnected from FL Studio",
    }))
}

pub async fn handle_get_connection_status(services: &McpServices) -> Result<Value> {
    Ok(json!({
        "success": true,
        "status": services.connection.connection_status(),
    }))
}

pub async fn handle_check_connection_health(services: &McpServices) -> Result<Value> {
    let healthy = services.connection.health_check().await;
    Ok(json!({
        "success": true,
        "healthy": healthy,
        "message": outcome(healthy, "Connection is healthy", "Connection is not healthy"),
    }))
}
