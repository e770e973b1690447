//! MCP Tools Handler
//!
//! Implements MCP-compliant tools/list and tools/call methods.
//! This module centralizes tool discovery and execution according to the
//! MCP 2024-11-05 specification.
//!
//! Tool failures (not connected, bad values, host errors) come back as a
//! normal result whose payload has `success: false` and whose `isError` flag
//! is set. Only an unknown tool or unreadable arguments become JSON-RPC errors.

use crate::mcp::handlers::{channels, connection, mixer, music, parse_args, payload, transport};
use crate::mcp::server::McpServices;
use crate::mcp::types::MCPError;
use serde_json::{json, Value};
use tracing::debug;

/// Handle tools/list MCP request
///
/// Returns the full tool catalog:
///
/// ```json
/// {
///   "tools": [
///     {
///       "name": "set_tempo",
///       "description": "...",
///       "inputSchema": { ... }
///     }
///   ]
/// }
/// ```
pub fn handle_tools_list(_params: Value) -> Result<Value, MCPError> {
    Ok(json!({
        "tools": get_tool_schemas()
    }))
}

/// Handle tools/call MCP request
///
/// Request format:
/// ```json
/// {
///   "name": "tool_name",
///   "arguments": { ... }
/// }
/// ```
///
/// Response format:
/// ```json
/// {
///   "content": [{
///     "type": "text",
///     "text": "{ \"success\": true, ... }"
///   }],
///   "isError": false
/// }
/// ```
pub async fn handle_tools_call(services: &McpServices, params: Value) -> Result<Value, MCPError> {
    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing 'name' parameter".to_string()))?;

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
    if !(arguments.is_object() || arguments.is_null()) {
        return Err(MCPError::invalid_params(format!(
            "Arguments for '{}' must be an object",
            tool_name
        )));
    }

    debug!("🔧 Calling tool: {}", tool_name);

    let result = match tool_name {
        // Connection
        "connect_to_fl_studio" => connection::handle_connect(services).await,
        "disconnect_from_fl_studio" => connection::handle_disconnect(services).await,
        "get_connection_status" => connection::handle_get_connection_status(services).await,
        "check_connection_health" => connection::handle_check_connection_health(services).await,

        // Transport
        "transport_start" => transport::handle_transport_start(services).await,
        "transport_stop" => transport::handle_transport_stop(services).await,
        "transport_record" => transport::handle_transport_record(services).await,
        "transport_jump_to" => {
            transport::handle_transport_jump_to(services, parse_args(arguments)?).await
        }
        "get_transport_status" => transport::handle_get_transport_status(services).await,
        "get_project_info" => transport::handle_get_project_info(services).await,
        "set_tempo" => transport::handle_set_tempo(services, parse_args(arguments)?).await,

        // Channel rack
        "get_channels" => channels::handle_get_channels(services).await,
        "select_channel" => {
            channels::handle_select_channel(services, parse_args(arguments)?).await
        }
        "set_channel_color" => {
            channels::handle_set_channel_color(services, parse_args(arguments)?).await
        }
        "create_note" => channels::handle_create_note(services, parse_args(arguments)?).await,

        // Mixer
        "get_mixer_levels" => mixer::handle_get_mixer_levels(services).await,
        "set_mixer_fader" => mixer::handle_set_mixer_fader(services, parse_args(arguments)?).await,
        "set_mixer_pan" => mixer::handle_set_mixer_pan(services, parse_args(arguments)?).await,
        "route_channel_to_mixer" => {
            mixer::handle_route_channel_to_mixer(services, parse_args(arguments)?).await
        }

        // Music theory
        "get_scale_notes" => music::handle_get_scale_notes(services, parse_args(arguments)?).await,
        "get_chord_notes" => music::handle_get_chord_notes(services, parse_args(arguments)?).await,

        _ => {
            return Err(MCPError::invalid_params(format!(
                "Unknown tool: {}",
                tool_name
            )))
        }
    };

    let data = payload(tool_name, result);
    let is_error = data["success"] == json!(false);

    let text = serde_json::to_string_pretty(&data)
        .map_err(|e| MCPError::internal_error(format!("JSON serialization failed: {}", e)))?;

    Ok(json!({
        "content": [{
            "type": "text",
            "text": text
        }],
        "isError": is_error
    }))
}

fn no_arguments() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

/// Generate JSON schemas for all available MCP tools
///
/// Schemas are maintained by hand so descriptions and ranges read well for
/// the calling agent.
fn get_tool_schemas() -> Value {
    json!([
        {
            "name": "connect_to_fl_studio",
            "description": "Connect to FL Studio through the MIDI request/response ports served by the device script. Must succeed before other tools unless auto-connect is enabled.",
            "inputSchema": no_arguments()
        },
        {
            "name": "disconnect_from_fl_studio",
            "description": "Close the connection to FL Studio",
            "inputSchema": no_arguments()
        },
        {
            "name": "get_connection_status",
            "description": "Report connection state, MIDI port names, auto-connect flag and timeout",
            "inputSchema": no_arguments()
        },
        {
            "name": "check_connection_health",
            "description": "Round-trip a trivial expression to verify FL Studio is responding",
            "inputSchema": no_arguments()
        },
        {
            "name": "transport_start",
            "description": "Start playback",
            "inputSchema": no_arguments()
        },
        {
            "name": "transport_stop",
            "description": "Stop playback",
            "inputSchema": no_arguments()
        },
        {
            "name": "transport_record",
            "description": "Toggle recording",
            "inputSchema": no_arguments()
        },
        {
            "name": "transport_jump_to",
            "description": "Move the song position",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "position": {
                        "type": "number",
                        "minimum": 0,
                        "description": "Song position in beats"
                    }
                },
                "required": ["position"]
            }
        },
        {
            "name": "get_transport_status",
            "description": "Get playing/recording state and the song position in beats",
            "inputSchema": no_arguments()
        },
        {
            "name": "get_project_info",
            "description": "Get tempo, channel count, mixer track count and transport state",
            "inputSchema": no_arguments()
        },
        {
            "name": "set_tempo",
            "description": "Set the project tempo",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "bpm": {
                        "type": "number",
                        "minimum": 20,
                        "maximum": 999,
                        "description": "Tempo in beats per minute"
                    }
                },
                "required": ["bpm"]
            }
        },
        {
            "name": "get_channels",
            "description": "List every channel rack channel with name, color and selection state",
            "inputSchema": no_arguments()
        },
        {
            "name": "select_channel",
            "description": "Select a channel in the channel rack",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Channel index (0-based)"
                    }
                },
                "required": ["channel_id"]
            }
        },
        {
            "name": "set_channel_color",
            "description": "Set a channel color",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Channel index (0-based)"
                    },
                    "color": {
                        "type": "string",
                        "description": "Hex color, e.g. 'FF5733' or '#FF5733'"
                    }
                },
                "required": ["channel_id", "color"]
            }
        },
        {
            "name": "create_note",
            "description": "Add a note to a channel's piano roll",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Channel index (0-based)"
                    },
                    "position": {
                        "type": "number",
                        "minimum": 0,
                        "description": "Start position in beats"
                    },
                    "key": {
                        "type": "integer",
                        "minimum": 0,
                        "maximum": 127,
                        "description": "MIDI note number (60 = C4)"
                    },
                    "duration": {
                        "type": "number",
                        "exclusiveMinimum": 0,
                        "description": "Length in beats"
                    },
                    "velocity": {
                        "type": "integer",
                        "minimum": 0,
                        "maximum": 127,
                        "default": 100,
                        "description": "Note velocity"
                    }
                },
                "required": ["channel_id", "position", "key", "duration"]
            }
        },
        {
            "name": "get_mixer_levels",
            "description": "List every mixer track with name, volume and pan",
            "inputSchema": no_arguments()
        },
        {
            "name": "set_mixer_fader",
            "description": "Set a mixer track volume",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "track_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Mixer track index (0 = Master)"
                    },
                    "volume": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 1,
                        "description": "Fader level"
                    }
                },
                "required": ["track_id", "volume"]
            }
        },
        {
            "name": "set_mixer_pan",
            "description": "Set a mixer track pan",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "track_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Mixer track index (0 = Master)"
                    },
                    "pan": {
                        "type": "number",
                        "minimum": -1,
                        "maximum": 1,
                        "description": "Pan position, -1 left to 1 right"
                    }
                },
                "required": ["track_id", "pan"]
            }
        },
        {
            "name": "route_channel_to_mixer",
            "description": "Route a channel to a mixer insert",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "channel_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Channel index (0-based)"
                    },
                    "track_id": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Mixer track index"
                    }
                },
                "required": ["channel_id", "track_id"]
            }
        },
        {
            "name": "get_scale_notes",
            "description": "Get the MIDI notes of a scale. Runs locally, no connection needed.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "root": {
                        "type": "string",
                        "description": "Root note with octave, e.g. 'C4' or 'F#3'"
                    },
                    "scale": {
                        "type": "string",
                        "enum": ["major", "minor", "pentatonic_major", "pentatonic_minor", "blues", "chromatic"],
                        "default": "major"
                    }
                },
                "required": ["root"]
            }
        },
        {
            "name": "get_chord_notes",
            "description": "Get the MIDI notes of a chord. Runs locally, no connection needed.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "root": {
                        "type": "string",
                        "description": "Root note with octave, e.g. 'C4' or 'Bb3'"
                    },
                    "chord": {
                        "type": "string",
                        "enum": ["major", "minor", "diminished", "augmented", "major_7th", "minor_7th", "dominant_7th", "sus2", "sus4"],
                        "default": "major"
                    }
                },
                "required": ["root"]
            }
        }
    ])
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;
