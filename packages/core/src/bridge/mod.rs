//! Remote Execution Bridge
//!
//! Everything between a validated request and the host:
//!
//! - [`protocol`] - structured expressions, correlation ids and SysEx framing
//! - [`transport`] - the seam a channel implementation plugs into
//! - [`midi`] - the MIDI port pair transport
//! - [`executor`] - connection lifecycle, serialized and time-limited evaluation
//! - [`envelope`] - the `{success, data | error, type}` result contract

pub mod envelope;
pub mod executor;
pub mod midi;
pub mod protocol;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use envelope::Envelope;
pub use executor::{ConnectionInfo, FlStudioBridge, DEFAULT_TIMEOUT};
pub use midi::MidiTransport;
pub use protocol::{
    Expression, RemoteCall, RemoteReply, RemoteRequest, HOST_SCRIPT, HOST_SCRIPT_NAME,
};
pub use transport::{DependencyState, RemoteSession, Transport};
