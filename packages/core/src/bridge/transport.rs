//! Remote Evaluation Transport Seam
//!
//! A [`Transport`] knows how to reach the host and opens [`RemoteSession`]s on
//! a named request/response port pair. The bridge owns at most one session at
//! a time and never talks to the channel directly.

use crate::bridge::protocol::RemoteRequest;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Provider of sessions on the remote evaluation channel
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short identifier shown in connection info
    fn name(&self) -> &str;

    /// Version of the underlying dependency, if it reports one
    fn version(&self) -> Option<String>;

    /// Check that the underlying dependency can be loaded.
    ///
    /// Fails with `DependencyUnavailable` when it cannot.
    fn probe(&self) -> Result<()>;

    /// Open a session on the named request/response ports
    async fn open(&self, request_port: &str, response_port: &str)
        -> Result<Box<dyn RemoteSession>>;
}

/// One open request/response channel to the host
#[async_trait]
pub trait RemoteSession: Send {
    /// Send a request and wait for its matching reply
    async fn evaluate(&mut self, request: &RemoteRequest) -> Result<Value>;

    /// Release the channel
    async fn close(&mut self) -> Result<()>;
}

/// Resolution state of the remote-execution dependency
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencyState {
    /// Never probed
    #[default]
    Unresolved,
    /// Probed successfully; cached for the bridge's lifetime
    Available,
    /// Last probe failed; probed again on the next connect
    Unavailable(String),
}

impl DependencyState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Pick a port by name: exact match first, then case-insensitive substring.
pub fn find_port<S: AsRef<str>>(available: &[S], wanted: &str) -> Option<usize> {
    if let Some(index) = available.iter().position(|name| name.as_ref() == wanted) {
        return Some(index);
    }

    let wanted = wanted.to_lowercase();
    available
        .iter()
        .position(|name| name.as_ref().to_lowercase().contains(&wanted))
}
