//! MCP Channel Rack Tool Handlers
//!
//! Channel listing, selection, coloring and note entry. Channel ids are
//! validated against the live channel count before anything is written.

use crate::error::Result;
use crate::mcp::handlers::outcome;
use crate::mcp::server::McpServices;
use crate::validation::{
    validate_channel_id, validate_color, validate_duration, validate_midi_key,
    validate_position, validate_velocity,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Velocity used when `create_note` is called without one
pub const DEFAULT_NOTE_VELOCITY: u8 = 100;

fn default_velocity() -> Value {
    json!(DEFAULT_NOTE_VELOCITY)
}

#[derive(Debug, Deserialize)]
pub struct SelectChannelParams {
    pub channel_id: Value,
}

#[derive(Debug, Deserialize)]
pub struct SetChannelColorParams {
    pub channel_id: Value,
    pub color: Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteParams {
    pub channel_id: Value,
    pub position: Value,
    pub key: Value,
    pub duration: Value,
    #[serde(default = "default_velocity")]
    pub velocity: Value,
}

pub async fn handle_get_channels(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let channels = services.channels.all().await;
    Ok(json!({
        "success": true,
        "count": channels.len(),
        "channels": channels,
    }))
}

pub async fn handle_select_channel(
    services: &McpServices,
    params: SelectChannelParams,
) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let count = services.channels.count().await;
    let channel_id = validate_channel_id(&params.channel_id, count)?;

    let ok = services.channels.select(channel_id).await;
    let name = services.channels.name(channel_id).await;
    Ok(json!({
        "success": ok,
        "channel_id": channel_id,
        "channel_name": name,
        "message": outcome(ok, format!("Selected channel: {}", name), "Failed to select channel"),
    }))
}

pub async fn handle_set_channel_color(
    services: &McpServices,
    params: SetChannelColorParams,
) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let count = services.channels.count().await;
    let channel_id = validate_channel_id(&params.channel_id, count)?;
    let color = validate_color(&params.color)?;

    let ok = services.channels.set_color(channel_id, &color).await?;
    Ok(json!({
        "success": ok,
        "channel_id": channel_id,
        "color": color,
        "message": outcome(
            ok,
            format!("Set channel {} color to {}", channel_id, color),
            "Failed to set channel color",
        ),
    }))
}

pub async fn handle_create_note(services: &McpServices, params: CreateNoteParams) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let count = services.channels.count().await;
    let channel_id = validate_channel_id(&params.channel_id, count)?;
    let position = validate_position(&params.position)?;
    let key = validate_midi_key(&params.key)?;
    let duration = validate_duration(&params.duration)?;
    let velocity = validate_velocity(&params.velocity)?;

    let ok = services
        .channels
        .add_note(channel_id, position, key, duration, velocity)
        .await;
    Ok(json!({
        "success": ok,
        "note": {
            "channel_id": channel_id,
            "position": position,
            "key": key,
            "duration": duration,
            "velocity": velocity,
        },
        "message": outcome(ok, "Note created successfully", "Failed to create note"),
    }))
}
