//! Tests for the MCP stdio loop
//!
//! Drives `serve` with in-memory input and reads back one response per line.

use super::*;
use crate::bridge::test_support::fake_services;
use crate::mcp::types::{INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR};

async fn exchange(services: &McpServices, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    serve(services, input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let (_transport, services) = fake_services(false);
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n",
    );

    let responses = exchange(&services, input).await;

    // The notification gets no response
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "flstudio-mcp");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn test_parse_error_keeps_serving() {
    let (_transport, services) = fake_services(false);
    let input = "{not json\n\n{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"tools/list\"}\n";

    let responses = exchange(&services, input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
    assert_eq!(responses[1]["id"], "a");
    assert!(responses[1]["result"]["tools"].is_array());
}

#[tokio::test]
async fn test_unknown_method() {
    let (_transport, services) = fake_services(false);
    let responses = exchange(
        &services,
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"resources/list\"}\n",
    )
    .await;

    assert_eq!(responses[0]["error"]["code"], METHOD_NOT_FOUND);
    assert!(responses[0].get("result").is_none());
}

#[tokio::test]
async fn test_tools_call_round_trip() {
    let (transport, services) = fake_services(true);
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"set_tempo","arguments":{"bpm":96}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
        "\n",
    );

    let responses = exchange(&services, input).await;

    assert_eq!(responses[0]["result"]["isError"], false);
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();
    assert_eq!(payload["tempo_bpm"], 96.0);
    assert_eq!(transport.host().tempo, 96.0);

    assert_eq!(responses[1]["error"]["code"], INVALID_PARAMS);
}

#[tokio::test]
async fn test_services_share_one_bridge() {
    let (_transport, services) = fake_services(false);
    services.connection.connect().await.unwrap();

    assert!(services.connection.bridge().is_connected());
    assert!(services.transport.start().await);
}
