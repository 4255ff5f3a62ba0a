//! Serve the Router over HTTP: a single `/mcp` POST endpoint taking one
//! JSON-RPC object and returning one JSON-RPC object, per §6's HTTP
//! framing rule. Grounded on the pack's axum-based MCP servers (e.g.
//! `michiel-ratchet`'s `axum-mcp`), simplified to the single-request-per-
//! POST contract the gateway actually needs (no SSE/streaming surface).

use crate::downstream::handle_message;
use crate::router::GatewaySession;
use crate::Gateway;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router as AxumRouter};
use mcp_core::messages::JsonRpcMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

struct HttpState {
    gateway: Arc<Gateway>,
    /// One gateway-level MCP session per HTTP server process. The spec's
    /// non-goal of downstream multiplexing is about upstream *sessions*,
    /// not this state machine, so a single shared instance is correct:
    /// every HTTP caller shares the same handshake sequence. Its own
    /// state is lock-free (`AtomicU8`), so no outer mutex is needed.
    session: GatewaySession,
}

/// Serve the Router at `http://host:port/mcp` until the process is
/// signalled to stop.
pub async fn serve(gateway: Arc<Gateway>, host: &str, port: u16) -> std::io::Result<()> {
    let state = Arc::new(HttpState {
        gateway,
        session: GatewaySession::new(),
    });

    let app = AxumRouter::new()
        .route("/mcp", post(handle_post))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    info!(%addr, "http downstream adapter listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn handle_post(
    State(state): State<Arc<HttpState>>,
    Json(message): Json<JsonRpcMessage>,
) -> impl IntoResponse {
    match handle_message(&state.gateway, &state.session, message).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
