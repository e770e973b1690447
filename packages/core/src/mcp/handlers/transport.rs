//! MCP Transport Tool Handlers
//!
//! Playback, position, tempo and the project summary.

use crate::error::Result;
use crate::mcp::handlers::outcome;
use crate::mcp::server::McpServices;
use crate::validation::{validate_position, validate_tempo};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct JumpToParams {
    pub position: Value,
}

#[derive(Debug, Deserialize)]
pub struct SetTempoParams {
    pub bpm: Value,
}

pub async fn handle_transport_start(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let ok = services.transport.start().await;
    Ok(json!({
        "success": ok,
        "message": outcome(ok, "Playback started", "Failed to start playback"),
    }))
}

pub async fn handle_transport_stop(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let ok = services.transport.stop().await;
    Ok(json!({
        "success": ok,
        "message": outcome(ok, "Playback stopped", "Failed to stop playback"),
    }))
}

pub async fn handle_transport_record(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let ok = services.transport.record().await;
    Ok(json!({
        "success": ok,
        "message": outcome(ok, "Recording toggled", "Failed to toggle recording"),
    }))
}

pub async fn handle_transport_jump_to(services: &McpServices, params: JumpToParams) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let position = validate_position(&params.position)?;
    let ok = services.transport.jump_to(position).await;
    Ok(json!({
        "success": ok,
        "position_beats": position,
        "message": outcome(
            ok,
            format!("Jumped to beat {}", position),
            "Failed to change song position",
        ),
    }))
}

pub async fn handle_get_transport_status(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let status = services.transport.status().await;
    Ok(json!({
        "success": true,
        "status": status,
    }))
}

/// Tempo, channel and track counts plus transport state in one call
pub async fn handle_get_project_info(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let tempo = services.transport.tempo().await;
    let channel_count = services.channels.count().await;
    let mixer_track_count = services.mixer.track_count().await;
    let transport = services.transport.status().await;
    Ok(json!({
        "success": true,
        "project_info": {
            "tempo_bpm": tempo,
            "channel_count": channel_count,
            "mixer_track_count": mixer_track_count,
            "transport": transport,
        },
    }))
}

pub async fn handle_set_tempo(services: &McpServices, params: SetTempoParams) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let bpm = validate_tempo(&params.bpm)?;
    let ok = services.transport.set_tempo(bpm).await;
    Ok(json!({
        "success": ok,
        "tempo_bpm": bpm,
        "message": outcome(ok, format!("Tempo set to {} BPM", bpm), "Failed to set tempo"),
    }))
}
