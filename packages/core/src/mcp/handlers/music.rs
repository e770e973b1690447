//! MCP Music Theory Tool Handlers
//!
//! Scale and chord lookups. These run locally and need no connection.

use crate::error::{BridgeError, Result};
use crate::mcp::server::McpServices;
use crate::utils::midi::{chord_notes, number_to_note, scale_notes, ChordType, MidiUtilError, ScaleType};
use serde::Deserialize;
use serde_json::{json, Value};

fn default_kind() -> String {
    "major".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ScaleParams {
    pub root: String,
    #[serde(default = "default_kind")]
    pub scale: String,
}

#[derive(Debug, Deserialize)]
pub struct ChordParams {
    pub root: String,
    #[serde(default = "default_kind")]
    pub chord: String,
}

fn invalid(error: MidiUtilError, parameter: &str, value: &str) -> BridgeError {
    BridgeError::invalid_parameter(error.to_string(), parameter, value)
}

fn render(root: &str, kind_key: &str, kind: &str, notes: Vec<u8>) -> Result<Value> {
    let names = notes
        .iter()
        .map(|n| number_to_note(*n).map_err(|e| invalid(e, "root", root)))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "success": true,
        "root": root,
        kind_key: kind,
        "notes": notes,
        "names": names,
    }))
}

pub async fn handle_get_scale_notes(_services: &McpServices, params: ScaleParams) -> Result<Value> {
    let scale: ScaleType = params
        .scale
        .parse()
        .map_err(|e| invalid(e, "scale", &params.scale))?;
    let notes = scale_notes(&params.root, scale).map_err(|e| invalid(e, "root", &params.root))?;
    render(&params.root, "scale", &scale.to_string(), notes)
}

pub async fn handle_get_chord_notes(_services: &McpServices, params: ChordParams) -> Result<Value> {
    let chord: ChordType = params
        .chord
        .parse()
        .map_err(|e| invalid(e, "chord", &params.chord))?;
    let notes = chord_notes(&params.root, chord).map_err(|e| invalid(e, "root", &params.root))?;
    render(&params.root, "chord", &chord.to_string(), notes)
}
