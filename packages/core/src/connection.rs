//! Connection Management
//!
//! Wraps the shared bridge with configuration (port names, auto-connect
//! policy, evaluation timeout) and the lifecycle helpers tool handlers call
//! before touching the host.

use crate::bridge::{ConnectionInfo, Expression, FlStudioBridge, Transport, DEFAULT_TIMEOUT};
use crate::error::{BridgeError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_REQUEST_PORT: &str = "Flapi Request";
pub const DEFAULT_RESPONSE_PORT: &str = "Flapi Response";

/// Connection settings, read once when the manager is built
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// MIDI port requests are sent on
    pub request_port: String,

    /// MIDI port replies arrive on
    pub response_port: String,

    /// Connect on demand when a tool needs the host
    pub auto_connect: bool,

    /// Bound on a single remote evaluation
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            request_port: DEFAULT_REQUEST_PORT.to_string(),
            response_port: DEFAULT_RESPONSE_PORT.to_string(),
            auto_connect: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Read configuration from the environment.
    ///
    /// - `FLAPI_REQUEST_PORT` / `FLAPI_RESPONSE_PORT` - port names
    /// - `FL_AUTO_CONNECT` - `"true"` (any case) enables auto-connect
    /// - `FLAPI_TIMEOUT_MS` - evaluation timeout in milliseconds
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = match lookup("FLAPI_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!(
                        "Ignoring invalid FLAPI_TIMEOUT_MS={:?}, using {} ms",
                        raw,
                        defaults.timeout.as_millis()
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            request_port: lookup("FLAPI_REQUEST_PORT").unwrap_or(defaults.request_port),
            response_port: lookup("FLAPI_RESPONSE_PORT").unwrap_or(defaults.response_port),
            auto_connect: lookup("FL_AUTO_CONNECT")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            timeout,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.request_port.trim().is_empty() {
            return Err("request_port cannot be empty".to_string());
        }

        if self.response_port.trim().is_empty() {
            return Err("response_port cannot be empty".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MidiPorts {
    pub request: String,
    pub response: String,
}

/// Bridge state plus the configuration it runs with
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    #[serde(flatten)]
    pub info: ConnectionInfo,
    pub midi_ports: MidiPorts,
    pub auto_connect: bool,
    pub timeout_ms: u64,
}

pub struct ConnectionManager {
    bridge: Arc<FlStudioBridge>,
    config: ConnectionConfig,
}

impl ConnectionManager {
    pub fn new(bridge: Arc<FlStudioBridge>, config: ConnectionConfig) -> Self {
        Self { bridge, config }
    }

    /// Build the bridge for `transport` using the configured timeout
    pub fn with_transport(transport: Arc<dyn Transport>, config: ConnectionConfig) -> Self {
        let bridge = Arc::new(FlStudioBridge::with_timeout(transport, config.timeout));
        Self::new(bridge, config)
    }

    pub fn bridge(&self) -> &Arc<FlStudioBridge> {
        &self.bridge
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.bridge.is_connected()
    }

    /// Connect using the configured ports
    pub async fn connect(&self) -> Result<bool> {
        if self.bridge.is_connected() {
            info!("Already connected to FL Studio");
            return Ok(true);
        }

        info!(
            "Connecting to FL Studio (ports: {}, {})",
            self.config.request_port, self.config.response_port
        );
        self.bridge
            .connect(&self.config.request_port, &self.config.response_port)
            .await
    }

    pub async fn disconnect(&self) {
        self.bridge.disconnect().await;
    }

    /// Make sure a connection exists before talking to the host.
    ///
    /// With auto-connect on, makes exactly one connect attempt.
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.bridge.is_connected() {
            return Ok(());
        }

        if !self.config.auto_connect {
            return Err(BridgeError::connection_failed(
                "Not connected to FL Studio. Connect manually first.",
            ));
        }

        info!("Auto-connecting to FL Studio");
        self.connect().await.map(|_| ())
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus {
            info: self.bridge.connection_info(),
            midi_ports: MidiPorts {
                request: self.config.request_port.clone(),
                response: self.config.response_port.clone(),
            },
            auto_connect: self.config.auto_connect,
            timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Round-trip a trivial expression. Never fails.
    pub async fn health_check(&self) -> bool {
        if !self.bridge.is_connected() {
            return false;
        }

        let envelope = self.bridge.safe_execute(Expression::eval("1 + 1")).await;
        if let Some(error) = envelope.error() {
            warn!("Health check failed: {}", error);
        }
        envelope.is_success()
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;
