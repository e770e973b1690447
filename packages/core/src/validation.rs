//! Parameter Validation
//!
//! Validators for every caller-supplied scalar that ends up in a host request.
//! Each validator takes the raw JSON value exactly as the agent sent it, coerces
//! it to the target type and checks it against the domain range. All of these
//! use the reject policy: out-of-range input fails with
//! [`BridgeError::InvalidParameter`] carrying the parameter name and the raw
//! value. The clamp-policy velocity helper lives in [`crate::utils::midi`].

use crate::error::{BridgeError, Result};
use serde_json::Value;
use std::path::PathBuf;

pub const MIN_TEMPO: f64 = 20.0;
pub const MAX_TEMPO: f64 = 999.0;
pub const MIDI_MAX: i64 = 127;

/// Upper bound used for id validation when the live count is not known
pub const DEFAULT_MAX_ID: u32 = 999;

/// Coerce a JSON value to a finite float.
///
/// Numbers and numeric strings are accepted; everything else fails.
fn coerce_f64(value: &Value, name: &str, label: &str) -> Result<f64> {
    let coerced = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match coerced {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(BridgeError::invalid_parameter(
            format!("{} must be a number, got {}", label, value),
            name,
            value.clone(),
        )),
    }
}

/// Coerce a JSON value to an integer.
///
/// Floats truncate toward zero; strings must hold an integer literal.
fn coerce_i64(value: &Value, name: &str, label: &str) -> Result<i64> {
    let coerced = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    coerced.ok_or_else(|| {
        BridgeError::invalid_parameter(
            format!("{} must be an integer, got {}", label, value),
            name,
            value.clone(),
        )
    })
}

fn check_id(value: &Value, max: u32, name: &str, label: &str) -> Result<u32> {
    let id = coerce_i64(value, name, label)?;
    if !(0..=i64::from(max)).contains(&id) {
        return Err(BridgeError::invalid_parameter(
            format!("{} must be between 0 and {}, got {}", label, max, id),
            name,
            value.clone(),
        ));
    }
    Ok(id as u32)
}

fn check_midi_byte(value: &Value, name: &str, label: &str) -> Result<u8> {
    let v = coerce_i64(value, name, label)?;
    if !(0..=MIDI_MAX).contains(&v) {
        return Err(BridgeError::invalid_parameter(
            format!("{} must be between 0 and {}, got {}", label, MIDI_MAX, v),
            name,
            value.clone(),
        ));
    }
    Ok(v as u8)
}

/// Validate a tempo in BPM, `[20.0, 999.0]`
pub fn validate_tempo(bpm: &Value) -> Result<f64> {
    let tempo = coerce_f64(bpm, "tempo", "Tempo")?;
    if !(MIN_TEMPO..=MAX_TEMPO).contains(&tempo) {
        return Err(BridgeError::invalid_parameter(
            format!(
                "Tempo must be between {} and {} BPM, got {}",
                MIN_TEMPO, MAX_TEMPO, tempo
            ),
            "tempo",
            bpm.clone(),
        ));
    }
    Ok(tempo)
}

/// Validate a MIDI key number, `[0, 127]`
pub fn validate_midi_key(key: &Value) -> Result<u8> {
    check_midi_byte(key, "key", "MIDI key")
}

/// Validate a note velocity, `[0, 127]`, rejecting out-of-range values
pub fn validate_velocity(velocity: &Value) -> Result<u8> {
    check_midi_byte(velocity, "velocity", "Velocity")
}

/// Validate a channel rack index against the live channel count
pub fn validate_channel_id(channel_id: &Value, max_channels: u32) -> Result<u32> {
    check_id(channel_id, max_channels, "channel_id", "Channel ID")
}

/// Validate a pattern index
pub fn validate_pattern_id(pattern_id: &Value, max_patterns: u32) -> Result<u32> {
    check_id(pattern_id, max_patterns, "pattern_id", "Pattern ID")
}

/// Validate a mixer track index against the live track count (0 = Master)
pub fn validate_mixer_track_id(track_id: &Value, max_tracks: u32) -> Result<u32> {
    check_id(track_id, max_tracks, "track_id", "Mixer track ID")
}

/// Validate a fader level, `[0.0, 1.0]`
pub fn validate_volume(volume: &Value) -> Result<f64> {
    let v = coerce_f64(volume, "volume", "Volume")?;
    if !(0.0..=1.0).contains(&v) {
        return Err(BridgeError::invalid_parameter(
            format!("Volume must be between 0.0 and 1.0, got {}", v),
            "volume",
            volume.clone(),
        ));
    }
    Ok(v)
}

/// Validate a pan position, `[-1.0, 1.0]` (left to right)
pub fn validate_pan(pan: &Value) -> Result<f64> {
    let v = coerce_f64(pan, "pan", "Pan")?;
    if !(-1.0..=1.0).contains(&v) {
        return Err(BridgeError::invalid_parameter(
            format!("Pan must be between -1.0 and 1.0, got {}", v),
            "pan",
            pan.clone(),
        ));
    }
    Ok(v)
}

/// Validate a song position in beats, `>= 0`
pub fn validate_position(position: &Value) -> Result<f64> {
    let v = coerce_f64(position, "position", "Position")?;
    if v < 0.0 {
        return Err(BridgeError::invalid_parameter(
            format!("Position must be >= 0, got {}", v),
            "position",
            position.clone(),
        ));
    }
    Ok(v)
}

/// Validate a note length in beats, `> 0`
pub fn validate_duration(duration: &Value) -> Result<f64> {
    let v = coerce_f64(duration, "duration", "Duration")?;
    if v <= 0.0 {
        return Err(BridgeError::invalid_parameter(
            format!("Duration must be > 0, got {}", v),
            "duration",
            duration.clone(),
        ));
    }
    Ok(v)
}

/// Validate a hex color and normalize it to `#RRGGBB`.
///
/// Accepts `"FF5733"` and `"#FF5733"`; case is preserved.
pub fn validate_color(color: &Value) -> Result<String> {
    let raw = color.as_str().ok_or_else(|| {
        BridgeError::invalid_parameter(
            format!("Color must be a string, got {}", color),
            "color",
            color.clone(),
        )
    })?;

    let hex = raw.strip_prefix('#').unwrap_or(raw);

    if hex.len() != 6 {
        return Err(BridgeError::invalid_parameter(
            format!(
                "Color must be 6-character hex string (e.g., 'FF5733'), got '{}'",
                hex
            ),
            "color",
            color.clone(),
        ));
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BridgeError::invalid_parameter(
            format!("Color must be a valid hex string, got '{}'", hex),
            "color",
            color.clone(),
        ));
    }

    Ok(format!("#{}", hex))
}

/// Render a host color integer as `#RRGGBB`.
///
/// The host packs colors into signed 32-bit values; only the low 24 bits
/// carry the RGB triple.
pub fn color_to_hex(color: i64) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}

/// Parse a `#RRGGBB` / `RRGGBB` string into the host color integer
pub fn hex_to_color(color: &str) -> Result<u32> {
    let normalized = validate_color(&Value::String(color.to_string()))?;
    u32::from_str_radix(&normalized[1..], 16).map_err(|e| {
        BridgeError::invalid_parameter(
            format!("Color must be a valid hex string: {}", e),
            "color",
            color,
        )
    })
}

/// Validate a filesystem path, expanding a leading `~`.
///
/// With `must_exist` the expanded path has to exist on disk.
pub fn validate_file_path(file_path: &Value, must_exist: bool) -> Result<PathBuf> {
    let raw = file_path.as_str().ok_or_else(|| {
        BridgeError::invalid_parameter(
            format!("File path must be a string, got {}", file_path),
            "file_path",
            file_path.clone(),
        )
    })?;

    let expanded = expand_home(raw);

    if must_exist && !expanded.exists() {
        return Err(BridgeError::invalid_parameter(
            format!("File does not exist: {}", expanded.display()),
            "file_path",
            file_path.clone(),
        ));
    }

    Ok(expanded)
}

fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;
