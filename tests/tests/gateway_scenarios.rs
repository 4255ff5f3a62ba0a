//! End-to-end coverage of the concrete scenarios against a zero-server
//! Gateway. Scenarios that need a live upstream (two-server merge,
//! disabled-tool filtering, dispatch forwarding, upstream-dies recovery,
//! idle eviction) are exercised at the unit level in `mcp-transport`
//! (`router::tests::merge_catalogs_*`, `session_manager::tests`) since they
//! need a container runtime this suite does not assume is present.

mod common;

use common::{empty_gateway, setup_test_logging};
use mcp_core::messages::{JsonRpcMessage, JsonRpcRequest};
use mcp_transport::{downstream, GatewaySession};
use serde_json::json;

fn init_request(id: i64) -> JsonRpcMessage {
    JsonRpcMessage::Request(JsonRpcRequest::new(
        id,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "c", "version": "0"},
        }),
    ))
}

#[tokio::test]
async fn handshake_returns_the_negotiated_protocol_version() {
    setup_test_logging();
    let gateway = empty_gateway();
    let session = GatewaySession::new();

    let response = downstream::handle_message(&gateway, &session, init_request(1))
        .await
        .expect("initialize always gets a response");

    let result = response.result.expect("initialize must succeed");
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "mcp-gateway");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
    assert!(result["capabilities"]["prompts"].is_object());
}

#[tokio::test]
async fn requests_before_handshake_are_rejected() {
    setup_test_logging();
    let gateway = empty_gateway();
    let session = GatewaySession::new();

    let list = JsonRpcMessage::Request(JsonRpcRequest::new(1, "tools/list", json!({})));
    let response = downstream::handle_message(&gateway, &session, list)
        .await
        .unwrap();

    assert!(response.result.is_none());
    assert!(response.error.is_some());
}

#[tokio::test]
async fn tools_list_always_advertises_the_gateway_internal_tools() {
    setup_test_logging();
    let gateway = empty_gateway();
    let session = GatewaySession::new();

    downstream::handle_message(&gateway, &session, init_request(1)).await;
    let notification_json = json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized",
    });
    let notification: JsonRpcMessage = serde_json::from_value(notification_json).unwrap();
    downstream::handle_message(&gateway, &session, notification).await;

    let list = JsonRpcMessage::Request(JsonRpcRequest::new(2, "tools/list", json!({})));
    let response = downstream::handle_message(&gateway, &session, list)
        .await
        .unwrap();

    let tools = response.result.unwrap()["tools"].clone();
    let names: Vec<String> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();

    assert!(names.contains(&"gateway_list_servers".to_string()));
    assert!(names.contains(&"gateway_refresh_catalog".to_string()));
}

#[tokio::test]
async fn gateway_list_servers_reports_an_empty_roster() {
    setup_test_logging();
    let gateway = empty_gateway();
    let session = GatewaySession::new();

    downstream::handle_message(&gateway, &session, init_request(1)).await;
    session.complete_initialize();

    let call = JsonRpcMessage::Request(JsonRpcRequest::new(
        2,
        "tools/call",
        json!({"name": "gateway_list_servers", "arguments": {}}),
    ));
    let response = downstream::handle_message(&gateway, &session, call)
        .await
        .unwrap();

    let result = response.result.expect("gateway_list_servers always succeeds");
    assert_eq!(result["content"][0]["text"], "");
    assert_eq!(result["is_error"], false);
}

#[tokio::test]
async fn unknown_method_after_handshake_is_method_not_found() {
    setup_test_logging();
    let gateway = empty_gateway();
    let session = GatewaySession::new();

    downstream::handle_message(&gateway, &session, init_request(1)).await;

    let request = JsonRpcMessage::Request(JsonRpcRequest::new(2, "not/a/method", json!({})));
    let response = downstream::handle_message(&gateway, &session, request)
        .await
        .unwrap();

    let error = response.error.expect("unknown methods are rejected");
    assert_eq!(error.code, -32601);
}
