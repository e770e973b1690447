//! FL Studio Bridge
//!
//! Owns the connection to the host and turns expressions into remote
//! evaluations. One bridge is built by the composition root and shared by
//! `Arc` between the connection manager and the domain accessors.
//!
//! # Concurrency
//!
//! The open session lives behind a `tokio::sync::Mutex`, so connect,
//! disconnect and every evaluation are serialized: at most one request is in
//! flight. Connection state and dependency state are plain reads.

use crate::bridge::envelope::Envelope;
use crate::bridge::protocol::{Expression, RemoteRequest, HOST_SCRIPT_NAME};
use crate::bridge::transport::{DependencyState, RemoteSession, Transport};
use crate::error::{BridgeError, Result};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default bound on a single remote evaluation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Snapshot returned by [`FlStudioBridge::connection_info`]
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub connected: bool,
    pub dependency_available: bool,
    pub dependency_version: Option<String>,
    pub transport: String,
    pub connected_at: Option<DateTime<Utc>>,
}

pub struct FlStudioBridge {
    transport: Arc<dyn Transport>,
    dependency: Mutex<DependencyState>,
    session: tokio::sync::Mutex<Option<Box<dyn RemoteSession>>>,
    connected: AtomicBool,
    connected_at: Mutex<Option<DateTime<Utc>>>,
    timeout: Duration,
}

impl FlStudioBridge {
    /// Create a disconnected bridge with the default timeout
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_timeout(transport, DEFAULT_TIMEOUT)
    }

    /// Create a disconnected bridge with a custom evaluation timeout
    pub fn with_timeout(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self {
            transport,
            dependency: Mutex::new(DependencyState::Unresolved),
            session: tokio::sync::Mutex::new(None),
            connected: AtomicBool::new(false),
            connected_at: Mutex::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn dependency_state(&self) -> DependencyState {
        self.dependency
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Resolve the transport dependency. `Available` is cached, anything
    /// else is probed again.
    fn ensure_dependency(&self) -> Result<()> {
        let mut state = self.dependency.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_available() {
            return Ok(());
        }

        match self.transport.probe() {
            Ok(()) => {
                info!("✅ Remote execution dependency '{}' loaded", self.transport.name());
                *state = DependencyState::Available;
                Ok(())
            }
            Err(e) => {
                warn!("Remote execution dependency unavailable: {}", e);
                *state = DependencyState::Unavailable(e.to_string());
                match e {
                    BridgeError::DependencyUnavailable { .. } => Err(e),
                    other => Err(BridgeError::dependency_unavailable(other.to_string())),
                }
            }
        }
    }

    /// Open a session on the given ports.
    ///
    /// Returns `Ok(true)` without side effects when already connected.
    pub async fn connect(&self, request_port: &str, response_port: &str) -> Result<bool> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            warn!("Already connected to FL Studio");
            return Ok(true);
        }

        self.ensure_dependency()?;

        match self.transport.open(request_port, response_port).await {
            Ok(opened) => {
                *session = Some(opened);
                self.connected.store(true, Ordering::SeqCst);
                *self.connected_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());
                info!(
                    "🎛️  Connected to FL Studio (request={}, response={})",
                    request_port, response_port
                );
                Ok(true)
            }
            Err(e @ BridgeError::PortNotFound { .. })
            | Err(e @ BridgeError::DependencyUnavailable { .. }) => Err(e),
            Err(e) => Err(BridgeError::connection_failed(format!(
                "Failed to connect to FL Studio: {}\nMake sure FL Studio is running and the {} device script is loaded on the request port.",
                e, HOST_SCRIPT_NAME
            ))),
        }
    }

    /// Close the session if one is open. Never fails.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut open) = session.take() {
            if let Err(e) = open.close().await {
                warn!("Error during disconnect: {}", e);
            }
            info!("🔌 Disconnected from FL Studio");
        }
        self.connected.store(false, Ordering::SeqCst);
        *self.connected_at.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Evaluate an expression on the host.
    ///
    /// Fails with `NotConnected` when disconnected, `RemoteExecution` when the
    /// host rejects the request, the channel breaks or the timeout expires, and
    /// `Unexpected` when the session panics.
    pub async fn execute(&self, expr: impl Into<Expression>) -> Result<Value> {
        if !self.is_connected() {
            return Err(BridgeError::not_connected());
        }

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(BridgeError::not_connected)?;

        let request = RemoteRequest::new(expr.into());
        debug!("Executing {} (id={})", request.expr, request.id);

        let evaluation = AssertUnwindSafe(session.evaluate(&request)).catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, evaluation).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(BridgeError::unexpected(panic_message(panic))),
            Err(_) => Err(BridgeError::remote_execution(
                format!(
                    "Failed to execute code in FL Studio: timed out after {} ms",
                    self.timeout.as_millis()
                ),
                "executor",
            )),
        };

        outcome.map_err(|e| {
            let e = match e {
                BridgeError::RemoteExecution { .. } | BridgeError::Unexpected { .. } => e,
                other => BridgeError::remote_execution(
                    format!("Failed to execute code in FL Studio: {}", other),
                    "executor",
                ),
            };
            error!("❌ Error executing {}: {}", request.expr, e);
            e
        })
    }

    /// Evaluate an expression, folding every failure into the envelope
    pub async fn safe_execute(&self, expr: impl Into<Expression>) -> Envelope {
        match self.execute(expr).await {
            Ok(data) => Envelope::success(data),
            Err(e) => Envelope::failure(&e),
        }
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        let dependency_available = self.dependency_state().is_available();
        ConnectionInfo {
            connected: self.is_connected(),
            dependency_available,
            dependency_version: if dependency_available {
                self.transport.version()
            } else {
                None
            },
            transport: self.transport.name().to_string(),
            connected_at: *self.connected_at.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("remote session panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("remote session panicked: {}", message)
    } else {
        "remote session panicked".to_string()
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;
