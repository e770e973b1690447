//! Utility functions for the FL Studio MCP core
//!
//! Pure helpers with no connection to the host.

pub mod midi;

pub use midi::{clamp_velocity, MidiUtilError};
