//! Gateway-level error taxonomy.
//!
//! Mirrors `mcp_core::error`'s layered `thiserror` idiom, generalized from a
//! single upstream client to the gateway's dispatch layer: every Router/
//! Session/ContainerSupervisor failure folds into one [`GatewayError`] with
//! an `is_retryable()` classifier and a `category()` tag used as the `data`
//! reason on the JSON-RPC error sent downstream.

use mcp_common::ServerId;
use thiserror::Error;

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised anywhere in the gateway's runtime plane.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The Transport for a server could not be reached at all.
    #[error("transport unavailable for server {server_id}")]
    TransportUnavailable {
        /// The server whose transport is unavailable.
        server_id: ServerId,
    },

    /// The Transport for a server was already closed.
    #[error("transport closed for server {server_id}")]
    TransportClosed {
        /// The server whose transport closed.
        server_id: ServerId,
    },

    /// A request to an upstream did not complete before its timeout.
    #[error("{operation} on server {server_id} timed out after {duration_ms}ms")]
    TransportTimeout {
        /// The server the request targeted.
        server_id: ServerId,
        /// The operation that timed out (e.g. `"tools/call"`).
        operation: String,
        /// The configured timeout, in milliseconds.
        duration_ms: u64,
    },

    /// An upstream responded with a JSON-RPC error object, passed through verbatim.
    #[error("upstream error {code}: {message}")]
    Upstream {
        /// JSON-RPC error code from the upstream.
        code: i32,
        /// JSON-RPC error message from the upstream.
        message: String,
        /// JSON-RPC error data from the upstream, if any.
        data: Option<serde_json::Value>,
    },

    /// Session creation failed at a named step of the §4.3 sequence.
    #[error("session start failed for server {server_id} at step {step}")]
    SessionStartFailed {
        /// The server whose session failed to start.
        server_id: ServerId,
        /// Which creation step failed (e.g. `"container_start"`, `"handshake"`).
        step: &'static str,
    },

    /// A dispatch targeted a server id with no active, known configuration.
    #[error("unknown server {server_id}")]
    UnknownServer {
        /// The unrecognized server id.
        server_id: ServerId,
    },

    /// A dispatch targeted a tool absent or disabled on the named server.
    #[error("unknown or disabled tool {tool} on server {server_id}")]
    UnknownTool {
        /// The server the tool was looked up on.
        server_id: ServerId,
        /// The unprefixed tool name.
        tool: String,
    },

    /// A dispatch targeted a resource absent or disabled on the named server.
    #[error("unknown or disabled resource {uri} on server {server_id}")]
    UnknownResource {
        /// The server the resource was looked up on.
        server_id: ServerId,
        /// The original (unprefixed) resource URI.
        uri: String,
    },

    /// A dispatch targeted a prompt absent or disabled on the named server.
    #[error("unknown or disabled prompt {prompt} on server {server_id}")]
    UnknownPrompt {
        /// The server the prompt was looked up on.
        server_id: ServerId,
        /// The unprefixed prompt name.
        prompt: String,
    },

    /// A downstream request arrived out of the gateway's MCP state sequence.
    #[error("protocol sequence error: expected {expected}, got {got}")]
    ProtocolSequenceError {
        /// The state or method that was expected.
        expected: &'static str,
        /// The method name that actually arrived.
        got: String,
    },

    /// Catch-all for everything else. Never carries a stack trace or raw
    /// container output -- `reason` is a short, safe-to-log tag.
    #[error("internal error: {reason}")]
    Internal {
        /// Short, non-sensitive reason tag.
        reason: String,
    },

    /// Wraps a lower-layer transport/protocol error from `mcp-core`.
    #[error(transparent)]
    Mcp(#[from] mcp_core::error::McpError),

    /// Wraps a container-engine failure from `bollard`.
    #[error("container engine error: {0}")]
    Container(#[from] bollard::errors::Error),
}

impl GatewayError {
    /// Short reason tag suitable for a JSON-RPC error's `data.reason` field.
    /// Never includes secrets or raw container output.
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::TransportUnavailable { .. } => "transport_unavailable",
            GatewayError::TransportClosed { .. } => "upstream_closed",
            GatewayError::TransportTimeout { .. } => "upstream_timeout",
            GatewayError::Upstream { .. } => "upstream_error",
            GatewayError::SessionStartFailed { .. } => "session_start_failed",
            GatewayError::UnknownServer { .. } => "unknown_server",
            GatewayError::UnknownTool { .. } => "unknown_tool",
            GatewayError::UnknownResource { .. } => "unknown_resource",
            GatewayError::UnknownPrompt { .. } => "unknown_prompt",
            GatewayError::ProtocolSequenceError { .. } => "protocol_sequence_error",
            GatewayError::Internal { .. } => "internal_error",
            GatewayError::Mcp(_) => "upstream_error",
            GatewayError::Container(_) => "container_error",
        }
    }

    /// Whether retrying the same call might succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::TransportUnavailable { .. }
                | GatewayError::TransportClosed { .. }
                | GatewayError::TransportTimeout { .. }
        )
    }

    /// Build an [`GatewayError::Internal`] from a displayable reason.
    pub fn internal(reason: impl std::fmt::Display) -> Self {
        GatewayError::Internal {
            reason: reason.to_string(),
        }
    }

    /// Convert this error into a JSON-RPC error object carrying the
    /// upstream code when available, the category tag in `data.reason`
    /// otherwise. Never leaks secrets or raw container output.
    pub fn to_jsonrpc_error(&self) -> mcp_core::messages::JsonRpcError {
        use mcp_core::messages::JsonRpcError;
        match self {
            GatewayError::Upstream { code, message, data } => {
                JsonRpcError::new(*code, message.clone(), data.clone())
            }
            other => JsonRpcError::new(
                -32000,
                other.to_string(),
                Some(serde_json::json!({ "reason": other.category() })),
            ),
        }
    }
}
