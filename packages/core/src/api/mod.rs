//! Domain Accessors
//!
//! Typed wrappers over the host's scripting modules. Each accessor method
//! builds one structured [`RemoteCall`](crate::bridge::RemoteCall), runs it
//! through `safe_execute` and unwraps the envelope, falling back to a fixed
//! default when the host call fails.

pub mod channels;
pub mod mixer;
pub mod transport;

pub use channels::{ChannelApi, ChannelInfo};
pub use mixer::{MixerApi, TrackLevels};
pub use transport::{TransportApi, TransportStatus};

use crate::bridge::Envelope;
use serde_json::Value;

/// Host value as a float; numbers and numeric strings only
fn number_or(envelope: &Envelope, default: f64) -> f64 {
    match envelope.data() {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Host value as an integer; floats truncate
fn integer_or(envelope: &Envelope, default: i64) -> i64 {
    match envelope.data() {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Host value as text; `null` or a failed call gives the default
fn text_or(envelope: &Envelope, default: impl FnOnce() -> String) -> String {
    match envelope.data() {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default(),
        Some(other) => other.to_string(),
    }
}

/// Truthiness of a host value; a failed call is false
fn flag(envelope: &Envelope) -> bool {
    match envelope.data() {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}

/// Clamp a host count into `u32`
fn count_or_zero(envelope: &Envelope) -> u32 {
    u32::try_from(integer_or(envelope, 0)).unwrap_or(0)
}
