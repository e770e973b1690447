//! Tests for the FL Studio bridge
//!
//! Runs against the in-process fake host, so connection lifecycle, error
//! classification and the envelope contract are covered without MIDI ports.

use super::*;
use crate::bridge::protocol::{RemoteCall, HOST_SCRIPT_NAME};
use crate::bridge::test_support::{connected_bridge, FakeTransport};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::AtomicUsize;

fn bridge_for(transport: &Arc<FakeTransport>) -> FlStudioBridge {
    FlStudioBridge::with_timeout(transport.clone(), Duration::from_millis(200))
}

#[tokio::test]
async fn test_execute_while_disconnected() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    let err = bridge.execute(Expression::eval("1+1")).await.unwrap_err();
    assert!(matches!(err, BridgeError::NotConnected { .. }));

    let envelope = bridge.safe_execute(Expression::eval("1+1")).await;
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "success": false,
            "error": "Not connected to FL Studio. Call connect() first.",
            "type": "not_connected"
        })
    );
    assert!(transport.host().calls.is_empty());
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    assert!(bridge.connect("Flapi Request", "Flapi Response").await.unwrap());
    assert!(bridge.connect("Flapi Request", "Flapi Response").await.unwrap());

    assert!(bridge.is_connected());
    assert_eq!(transport.opens(), 1);
}

#[tokio::test]
async fn test_disconnect_never_fails() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    // No-op while disconnected
    bridge.disconnect().await;
    assert_eq!(transport.closes(), 0);

    bridge.connect("a", "b").await.unwrap();
    bridge.disconnect().await;
    bridge.disconnect().await;

    assert!(!bridge.is_connected());
    assert_eq!(transport.closes(), 1);
    assert!(bridge.connection_info().connected_at.is_none());
}

#[tokio::test]
async fn test_dependency_unavailable_is_retried() {
    let transport = FakeTransport::unavailable();
    let bridge = bridge_for(&transport);

    let err = bridge.connect("a", "b").await.unwrap_err();
    assert_eq!(err.kind(), "dependency_unavailable");
    assert!(!bridge.is_connected());
    assert!(matches!(
        bridge.dependency_state(),
        DependencyState::Unavailable(_)
    ));
    assert_eq!(transport.opens(), 0);

    transport.set_available(true);
    assert!(bridge.connect("a", "b").await.unwrap());
    assert_eq!(bridge.dependency_state(), DependencyState::Available);
}

#[tokio::test]
async fn test_available_dependency_is_cached() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    bridge.connect("a", "b").await.unwrap();
    bridge.disconnect().await;

    transport.set_available(false);
    assert!(bridge.connect("a", "b").await.unwrap());
}

#[tokio::test]
async fn test_open_failure_becomes_connection_error() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    transport.fail_next_open(BridgeError::unexpected("device busy"));
    let err = bridge.connect("a", "b").await.unwrap_err();

    assert_eq!(err.kind(), "connection_error");
    assert!(err.to_string().contains("device busy"));
    assert!(err.to_string().contains(HOST_SCRIPT_NAME));
    assert!(!err.to_string().contains("Flapi"));
    assert!(!bridge.is_connected());

    // Next attempt opens normally
    assert!(bridge.connect("a", "b").await.unwrap());
}

#[tokio::test]
async fn test_missing_port_is_reported_as_such() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    transport.fail_next_open(BridgeError::port_not_found("Flapi Request"));
    let err = bridge.connect("Flapi Request", "Flapi Response").await.unwrap_err();

    assert!(matches!(
        err,
        BridgeError::PortNotFound { ref port_name, .. } if port_name == "Flapi Request"
    ));
}

#[tokio::test]
async fn test_execute_returns_host_value() {
    let (_transport, bridge) = connected_bridge().await;

    assert_eq!(bridge.execute(Expression::eval("1 + 1")).await.unwrap(), json!(2));
    assert_eq!(
        bridge
            .execute(RemoteCall::new("transport", "getTempo"))
            .await
            .unwrap(),
        json!(140.0)
    );
}

#[tokio::test]
async fn test_host_errors_keep_their_component() {
    let (_transport, bridge) = connected_bridge().await;

    let err = bridge
        .execute(RemoteCall::new("mixer", "getTrackName").arg(42))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "remote_execution_error");
    assert_eq!(err.component(), Some("mixer"));
}

#[tokio::test]
async fn test_timeout_is_remote_execution_error() {
    let (_transport, bridge) = connected_bridge().await;

    let err = bridge.execute(Expression::eval("sleep")).await.unwrap_err();

    assert_eq!(err.kind(), "remote_execution_error");
    assert_eq!(err.component(), Some("executor"));
    assert!(err.to_string().contains("timed out after 200 ms"));
    assert!(bridge.is_connected());
}

#[tokio::test]
async fn test_session_panic_is_unexpected() {
    let (_transport, bridge) = connected_bridge().await;

    let err = bridge.execute(Expression::eval("panic")).await.unwrap_err();
    assert_eq!(err.kind(), "unexpected_error");
    assert!(err.to_string().contains("host exploded"));

    // The bridge keeps serving requests
    assert_eq!(bridge.execute(Expression::eval("1 + 1")).await.unwrap(), json!(2));
}

#[tokio::test]
async fn test_safe_execute_never_fails() {
    let (_transport, bridge) = connected_bridge().await;

    for expr in [
        Expression::eval("1 + 1"),
        Expression::eval("raise Exception()"),
        Expression::eval("panic"),
        RemoteCall::new("nope", "nothing").into(),
    ] {
        let envelope = serde_json::to_value(bridge.safe_execute(expr).await).unwrap();
        assert!(envelope["success"].is_boolean());
        if envelope["success"] == json!(false) {
            assert!(envelope["error"].is_string());
            assert!(envelope["type"].is_string());
            assert!(envelope.get("data").is_none());
        }
    }

    let unavailable = bridge_for(&FakeTransport::unavailable());
    let envelope = unavailable.safe_execute(Expression::eval("1 + 1")).await;
    assert_eq!(envelope.kind(), Some("not_connected"));
}

#[tokio::test]
async fn test_connection_info() {
    let transport = FakeTransport::new();
    let bridge = bridge_for(&transport);

    let info = bridge.connection_info();
    assert!(!info.connected);
    assert!(!info.dependency_available);
    assert!(info.dependency_version.is_none());
    assert_eq!(info.transport, "fake");

    bridge.connect("a", "b").await.unwrap();
    let info = serde_json::to_value(bridge.connection_info()).unwrap();
    assert_eq!(info["connected"], json!(true));
    assert_eq!(info["dependency_available"], json!(true));
    assert_eq!(info["dependency_version"], json!("fake-1.0"));
    assert!(info["connected_at"].is_string());
}

/// Session that records how many evaluations overlap
struct CountingSession {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteSession for CountingSession {
    async fn evaluate(&mut self, _request: &RemoteRequest) -> Result<Value> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(json!(true))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingTransport {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for CountingTransport {
    fn name(&self) -> &str {
        "counting"
    }

    fn version(&self) -> Option<String> {
        None
    }

    fn probe(&self) -> Result<()> {
        Ok(())
    }

    async fn open(&self, _request: &str, _response: &str) -> Result<Box<dyn RemoteSession>> {
        Ok(Box::new(CountingSession {
            in_flight: self.in_flight.clone(),
            peak: self.peak.clone(),
        }))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_evaluation_in_flight_under_concurrent_callers() {
    let transport = Arc::new(CountingTransport::default());
    let bridge = Arc::new(FlStudioBridge::with_timeout(
        transport.clone(),
        Duration::from_secs(10),
    ));
    bridge.connect("a", "b").await.unwrap();

    let calls: Vec<_> = (0..8)
        .map(|i| {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .safe_execute(RemoteCall::new("mixer", "getTrackVolume").arg(i))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for call in calls {
        if call.await.unwrap().is_success() {
            successes += 1;
        }
    }

    assert_eq!(successes, 8);
    assert_eq!(transport.peak.load(Ordering::SeqCst), 1);
    assert_eq!(transport.in_flight.load(Ordering::SeqCst), 0);
}
