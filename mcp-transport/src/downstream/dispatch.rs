//! Shared request dispatch used by both the stdio and HTTP downstream
//! adapters: one `JsonRpcMessage` in, at most one `JsonRpcResponse` out.

use crate::router::{GatewaySession, GATEWAY_LIST_SERVERS, GATEWAY_REFRESH_CATALOG};
use crate::Gateway;
use mcp_common::ToolRecord;
use mcp_core::messages::{
    Capabilities, Implementation, InitializeResponse, JsonRpcError, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, ProtocolVersion, PromptCapabilities, ResourceCapabilities,
    ToolCapabilities,
};
use serde_json::{json, Value};
use tracing::warn;

/// Handle one incoming downstream message against `gateway`'s current
/// state, advancing `session`'s handshake state machine as needed.
/// Returns `None` for notifications (which never get a response).
pub async fn handle_message(
    gateway: &Gateway,
    session: &GatewaySession,
    message: JsonRpcMessage,
) -> Option<JsonRpcResponse> {
    match message {
        JsonRpcMessage::Request(request) => Some(handle_request(gateway, session, request).await),
        JsonRpcMessage::Notification(notification) => {
            if notification.method == "notifications/initialized" {
                if let Err(e) = session.accept_initialized() {
                    warn!(error = %e, "rejected out-of-sequence initialized notification");
                }
            }
            None
        }
        JsonRpcMessage::Response(_) => None,
    }
}

async fn handle_request(
    gateway: &Gateway,
    session: &GatewaySession,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    let id = request.id.clone();

    if request.method == "initialize" {
        return match session.begin_initialize() {
            Ok(()) => {
                let response = InitializeResponse::new(
                    ProtocolVersion::V2024_11_05,
                    Capabilities {
                        standard: mcp_core::messages::StandardCapabilities {
                            tools: Some(ToolCapabilities { list_changed: Some(true) }),
                            resources: Some(ResourceCapabilities {
                                subscribe: Some(false),
                                list_changed: Some(true),
                            }),
                            prompts: Some(PromptCapabilities { list_changed: Some(true) }),
                            sampling: None,
                            logging: None,
                            roots: None,
                        },
                        custom: Default::default(),
                    },
                    Implementation::new("mcp-gateway", env!("CARGO_PKG_VERSION")),
                    None,
                );
                session.complete_initialize();
                match serde_json::to_value(response) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
                }
            }
            Err(e) => JsonRpcResponse::error(id, sequence_error(&e)),
        };
    }

    if let Err(e) = session.require_ready(&request.method) {
        return JsonRpcResponse::error(id, sequence_error(&e));
    }

    match request.method.as_str() {
        "tools/list" => {
            let configs = gateway.servers().await;
            let merged = gateway.router().list_catalog(&configs).await;
            let mut tools: Vec<Value> = merged
                .tools
                .iter()
                .map(|t| namespaced_tool_json(t))
                .collect();
            tools.push(json!({
                "name": GATEWAY_LIST_SERVERS,
                "description": "List every active upstream server known to the gateway.",
                "inputSchema": {"type": "object", "properties": {}},
            }));
            tools.push(json!({
                "name": GATEWAY_REFRESH_CATALOG,
                "description": "Force the merged catalog to be re-read on the next listing.",
                "inputSchema": {"type": "object", "properties": {}},
            }));
            JsonRpcResponse::success(id, json!({ "tools": tools }))
        }
        "resources/list" => {
            let configs = gateway.servers().await;
            let merged = gateway.router().list_catalog(&configs).await;
            let resources: Vec<Value> = merged
                .resources
                .iter()
                .map(|r| {
                    json!({
                        "uri": r.namespaced_uri(),
                        "name": r.name,
                        "description": r.description,
                        "mimeType": r.mime_type,
                    })
                })
                .collect();
            JsonRpcResponse::success(id, json!({ "resources": resources }))
        }
        "prompts/list" => {
            let configs = gateway.servers().await;
            let merged = gateway.router().list_catalog(&configs).await;
            let prompts: Vec<Value> = merged
                .prompts
                .iter()
                .map(|p| {
                    json!({
                        "name": p.namespaced_name(),
                        "description": p.description,
                        "arguments": p.arguments,
                    })
                })
                .collect();
            JsonRpcResponse::success(id, json!({ "prompts": prompts }))
        }
        "tools/call" => {
            let params = request.params.unwrap_or(json!({}));
            let name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
            let configs = gateway.servers().await;
            match gateway.router().call_tool(&configs, name, arguments).await {
                Ok(result) => match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
                },
                Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc_error()),
            }
        }
        "resources/read" => {
            let params = request.params.unwrap_or(json!({}));
            let uri = params.get("uri").and_then(Value::as_str).unwrap_or("");
            let configs = gateway.servers().await;
            match gateway.router().read_resource(&configs, uri).await {
                Ok(result) => match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
                },
                Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc_error()),
            }
        }
        "prompts/get" => {
            let params = request.params.unwrap_or(json!({}));
            let name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = params.get("arguments").cloned();
            let configs = gateway.servers().await;
            match gateway.router().get_prompt(&configs, name, arguments).await {
                Ok(result) => match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
                },
                Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc_error()),
            }
        }
        other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
    }
}

fn namespaced_tool_json(tool: &ToolRecord) -> Value {
    json!({
        "name": tool.namespaced_name(),
        "description": tool.description,
        "inputSchema": tool.input_schema,
    })
}

fn sequence_error(e: &crate::error::GatewayError) -> JsonRpcError {
    JsonRpcError::new(
        -32000,
        e.to_string(),
        Some(json!({ "reason": e.category() })),
    )
}
