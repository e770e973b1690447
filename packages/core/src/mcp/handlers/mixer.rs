//! MCP Mixer Tool Handlers

use crate::error::Result;
use crate::mcp::handlers::outcome;
use crate::mcp::server::McpServices;
use crate::validation::{validate_channel_id, validate_mixer_track_id, validate_pan, validate_volume};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SetFaderParams {
    pub track_id: Value,
    pub volume: Value,
}

#[derive(Debug, Deserialize)]
pub struct SetPanParams {
    pub track_id: Value,
    pub pan: Value,
}

#[derive(Debug, Deserialize)]
pub struct RouteChannelParams {
    pub channel_id: Value,
    pub track_id: Value,
}

pub async fn handle_get_mixer_levels(services: &McpServices) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let tracks = services.mixer.all_levels().await;
    Ok(json!({
        "success": true,
        "count": tracks.len(),
        "tracks": tracks,
    }))
}

pub async fn handle_set_mixer_fader(services: &McpServices, params: SetFaderParams) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let track_count = services.mixer.track_count().await;
    let track_id = validate_mixer_track_id(&params.track_id, track_count)?;
    let volume = validate_volume(&params.volume)?;

    let ok = services.mixer.set_volume(track_id, volume).await;
    let name = services.mixer.track_name(track_id).await;
    Ok(json!({
        "success": ok,
        "track_id": track_id,
        "track_name": name,
        "volume": volume,
        "message": outcome(
            ok,
            format!("Set {} volume to {:.2}", name, volume),
            "Failed to set mixer volume",
        ),
    }))
}

pub async fn handle_set_mixer_pan(services: &McpServices, params: SetPanParams) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let track_count = services.mixer.track_count().await;
    let track_id = validate_mixer_track_id(&params.track_id, track_count)?;
    let pan = validate_pan(&params.pan)?;

    let ok = services.mixer.set_pan(track_id, pan).await;
    let name = services.mixer.track_name(track_id).await;
    Ok(json!({
        "success": ok,
        "track_id": track_id,
        "track_name": name,
        "pan": pan,
        "message": outcome(
            ok,
            format!("Set {} pan to {:.2}", name, pan),
            "Failed to set mixer pan",
        ),
    }))
}

pub async fn handle_route_channel_to_mixer(
    services: &McpServices,
    params: RouteChannelParams,
) -> Result<Value> {
    services.connection.ensure_connected().await?;
    let channel_count = services.channels.count().await;
    let track_count = services.mixer.track_count().await;
    let channel_id = validate_channel_id(&params.channel_id, channel_count)?;
    let track_id = validate_mixer_track_id(&params.track_id, track_count)?;

    let ok = services.mixer.route_channel(channel_id, track_id).await;
    Ok(json!({
        "success": ok,
        "channel_id": channel_id,
        "track_id": track_id,
        "message": outcome(
            ok,
            format!("Routed channel {} to mixer track {}", channel_id, track_id),
            "Failed to route channel",
        ),
    }))
}
