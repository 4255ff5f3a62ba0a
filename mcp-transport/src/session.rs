//! Session: one live, initialized connection to a single upstream server.
//!
//! Grounded on `mcp-core/src/client.rs`'s connect/initialize/initialized
//! sequence, generalized to additionally own a container handle and to
//! discover three capability categories (tools/resources/prompts) instead
//! of acting as a single-purpose client.

use crate::container::ContainerSupervisor;
use crate::error::{GatewayError, GatewayResult};
use crate::transport_registry::{DialSpec, TransportRegistry};
use mcp_common::{
    CatalogEntryKind, PromptRecord, ResourceRecord, ServerConfig, ServerId, ToolRecord,
    TransportKind,
};
use mcp_core::messages::{
    Capabilities, Implementation, InitializeRequest, InitializeResponse, InitializedNotification,
    JsonRpcNotification, JsonRpcRequest, ProtocolVersion,
};
use mcp_core::transport::Transport;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const IDLE_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// A catalog snapshot discovered from one upstream server during §4.3 step 7.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Tools this server advertised, with enable-flag defaulted to `true`.
    pub tools: Vec<ToolRecord>,
    /// Resources this server advertised.
    pub resources: Vec<ResourceRecord>,
    /// Prompts this server advertised.
    pub prompts: Vec<PromptRecord>,
}

/// A live, initialized connection to one upstream MCP server.
pub struct Session {
    server_id: ServerId,
    transport: Arc<Mutex<Box<dyn Transport>>>,
    capabilities: Capabilities,
    /// The config this session was started from, including any
    /// `disabled_entries` overrides a management surface has set. Kept so
    /// `discover()` can re-apply them and so they can be mutated in place
    /// without restarting the session.
    config: Mutex<ServerConfig>,
    catalog: Mutex<Catalog>,
    last_activity: Mutex<Instant>,
    request_ids: AtomicU64,
}

impl Session {
    /// Run the full seven-step creation sequence for `config`: start the
    /// container, optionally run its install command, launch the start
    /// command, connect a Transport, perform the MCP handshake, and
    /// discover the server's tool/resource/prompt catalog.
    ///
    /// Steps 1-4 (container start through Transport connect) roll back on
    /// failure: the container is stopped and no Session is returned. Steps
    /// 5-7 (handshake and discovery) do not tear the container down on
    /// failure; the caller decides whether to retry or mark the server
    /// unhealthy.
    pub async fn start(
        config: &ServerConfig,
        supervisor: &ContainerSupervisor,
        registry: &TransportRegistry,
    ) -> GatewayResult<Self> {
        let server_id = config.id.clone();

        supervisor.run(config).await.map_err(|e| {
            warn!(%server_id, error = %e, "container start failed");
            GatewayError::SessionStartFailed {
                server_id: server_id.clone(),
                step: "container_start",
            }
        })?;

        if let Some(install_command) = &config.install_command {
            if let Err(e) = supervisor.exec_install(&server_id, install_command).await {
                supervisor.stop(&server_id).await.ok();
                warn!(%server_id, error = %e, "install command failed");
                return Err(GatewayError::SessionStartFailed {
                    server_id: server_id.clone(),
                    step: "install_command",
                });
            }
        }

        Self::connect(config, supervisor, registry).await
    }

    /// Attach to a container `config` names that the caller asserts is
    /// already running: skips the container-start and install-command
    /// steps entirely and execs straight into it. Used by `connect` mode,
    /// where building or recreating the container would defeat the point
    /// of attaching to a long-lived one.
    pub async fn attach(
        config: &ServerConfig,
        supervisor: &ContainerSupervisor,
        registry: &TransportRegistry,
    ) -> GatewayResult<Self> {
        Self::connect(config, supervisor, registry).await
    }

    async fn connect(
        config: &ServerConfig,
        supervisor: &ContainerSupervisor,
        registry: &TransportRegistry,
    ) -> GatewayResult<Self> {
        let server_id = config.id.clone();

        let dial = match config.transport_kind {
            TransportKind::Stdio => DialSpec {
                kind: TransportKind::Stdio,
                target: supervisor.stdio_exec_argv(&server_id, &config.start_command),
            },
            TransportKind::Http | TransportKind::Sse => {
                let endpoint = config
                    .transport_config
                    .as_ref()
                    .map(|t| t.endpoint.clone())
                    .ok_or_else(|| GatewayError::SessionStartFailed {
                        server_id: server_id.clone(),
                        step: "transport_config",
                    })?;
                DialSpec {
                    kind: config.transport_kind,
                    target: vec![endpoint],
                }
            }
        };

        let transport = registry.create(&server_id, dial).await.map_err(|e| {
            warn!(%server_id, error = %e, "transport connect failed");
            GatewayError::SessionStartFailed {
                server_id: server_id.clone(),
                step: "transport_connect",
            }
        })?;

        let mut session = Self {
            server_id: server_id.clone(),
            transport,
            capabilities: Capabilities::default(),
            config: Mutex::new(config.clone()),
            catalog: Mutex::new(Catalog::default()),
            last_activity: Mutex::new(Instant::now()),
            request_ids: AtomicU64::new(1),
        };

        session.handshake().await?;
        session.discover().await?;

        Ok(session)
    }

    fn next_id(&self) -> u64 {
        self.request_ids.fetch_add(1, Ordering::Relaxed)
    }

    async fn handshake(&mut self) -> GatewayResult<()> {
        let request = InitializeRequest::new(
            ProtocolVersion::V2024_11_05,
            Capabilities::default(),
            Implementation::new("mcp-gateway", env!("CARGO_PKG_VERSION")),
        );
        let rpc = JsonRpcRequest::new(
            self.next_id().to_string(),
            "initialize",
            serde_json::to_value(&request).map_err(|e| GatewayError::internal(e))?,
        );

        let mut transport = self.transport.lock().await;
        let response = transport
            .send_request(rpc, Some(Duration::from_secs(30)))
            .await
            .map_err(GatewayError::Mcp)?;

        if response.is_error() {
            return Err(GatewayError::SessionStartFailed {
                server_id: self.server_id.clone(),
                step: "handshake",
            });
        }

        let init: InitializeResponse = response
            .result_as()
            .map_err(|_| GatewayError::SessionStartFailed {
                server_id: self.server_id.clone(),
                step: "handshake",
            })?;
        self.capabilities = init.capabilities;

        transport
            .send_notification(JsonRpcNotification::new(
                "notifications/initialized",
                serde_json::to_value(InitializedNotification::new())
                    .map_err(|e| GatewayError::internal(e))?,
            ))
            .await
            .map_err(GatewayError::Mcp)?;

        debug!(server_id = %self.server_id, "handshake complete");
        Ok(())
    }

    async fn discover(&self) -> GatewayResult<()> {
        let mut catalog = Catalog::default();
        let config = self.config.lock().await.clone();
        let mut transport = self.transport.lock().await;

        if self.capabilities.standard.tools.is_some() {
            let rpc = JsonRpcRequest::new(self.next_id().to_string(), "tools/list", json!({}));
            let response = transport
                .send_request(rpc, Some(Duration::from_secs(30)))
                .await
                .map_err(GatewayError::Mcp)?;
            if !response.is_error() {
                let list: mcp_core::messages::ListToolsResponse = response
                    .result_as()
                    .map_err(|e| GatewayError::internal(e))?;
                catalog.tools = list
                    .tools
                    .into_iter()
                    .map(|t| {
                        let is_enabled =
                            !config.is_entry_disabled(CatalogEntryKind::Tool, &t.name);
                        ToolRecord {
                            server_id: self.server_id.clone(),
                            tool_name: t.name,
                            description: Some(t.description),
                            input_schema: t.input_schema.unwrap_or(json!({})),
                            is_enabled,
                        }
                    })
                    .collect();
            }
        }

        if self.capabilities.standard.resources.is_some() {
            let rpc =
                JsonRpcRequest::new(self.next_id().to_string(), "resources/list", json!({}));
            let response = transport
                .send_request(rpc, Some(Duration::from_secs(30)))
                .await
                .map_err(GatewayError::Mcp)?;
            if !response.is_error() {
                let list: mcp_core::messages::ListResourcesResponse = response
                    .result_as()
                    .map_err(|e| GatewayError::internal(e))?;
                catalog.resources = list
                    .resources
                    .into_iter()
                    .map(|r| {
                        let is_enabled =
                            !config.is_entry_disabled(CatalogEntryKind::Resource, &r.uri);
                        ResourceRecord {
                            server_id: self.server_id.clone(),
                            uri: r.uri,
                            name: Some(r.name),
                            description: r.description,
                            mime_type: r.mime_type,
                            is_enabled,
                        }
                    })
                    .collect();
            }
        }

        if self.capabilities.standard.prompts.is_some() {
            let rpc = JsonRpcRequest::new(self.next_id().to_string(), "prompts/list", json!({}));
            let response = transport
                .send_request(rpc, Some(Duration::from_secs(30)))
                .await
                .map_err(GatewayError::Mcp)?;
            if !response.is_error() {
                let list: mcp_core::messages::ListPromptsResponse = response
                    .result_as()
                    .map_err(|e| GatewayError::internal(e))?;
                catalog.prompts = list
                    .prompts
                    .into_iter()
                    .map(|p| {
                        let is_enabled =
                            !config.is_entry_disabled(CatalogEntryKind::Prompt, &p.name);
                        PromptRecord {
                            server_id: self.server_id.clone(),
                            prompt_name: p.name,
                            description: p.description,
                            arguments: p.arguments.unwrap_or(json!([])),
                            is_enabled,
                        }
                    })
                    .collect();
            }
        }

        drop(transport);
        *self.catalog.lock().await = catalog;
        info!(server_id = %self.server_id, "catalog discovered");
        Ok(())
    }

    /// The server this session connects to.
    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }

    /// Snapshot of this session's discovered catalog.
    pub async fn catalog(&self) -> Catalog {
        self.catalog.lock().await.clone()
    }

    /// Forward a `tools/call` request with the unprefixed tool name and the
    /// original arguments, unmodified.
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> GatewayResult<mcp_core::messages::CallToolResponse> {
        self.touch().await;
        let rpc = JsonRpcRequest::new(
            self.next_id().to_string(),
            "tools/call",
            json!({ "name": tool_name, "arguments": arguments }),
        );
        let mut transport = self.transport.lock().await;
        let response = transport
            .send_request(rpc, Some(Duration::from_secs(60)))
            .await
            .map_err(GatewayError::Mcp)?;
        if let Some(error) = &response.error {
            return Err(GatewayError::Upstream {
                code: error.code,
                message: error.message.clone(),
                data: error.data.clone(),
            });
        }
        response.result_as().map_err(|e| GatewayError::internal(e))
    }

    /// Forward a `resources/read` request for the unprefixed resource uri.
    pub async fn read_resource(
        &self,
        uri: &str,
    ) -> GatewayResult<mcp_core::messages::ReadResourceResponse> {
        self.touch().await;
        let rpc = JsonRpcRequest::new(
            self.next_id().to_string(),
            "resources/read",
            serde_json::to_value(mcp_core::messages::ReadResourceRequest {
                uri: uri.to_string(),
            })
            .map_err(|e| GatewayError::internal(e))?,
        );
        let mut transport = self.transport.lock().await;
        let response = transport
            .send_request(rpc, Some(Duration::from_secs(30)))
            .await
            .map_err(GatewayError::Mcp)?;
        if let Some(error) = &response.error {
            return Err(GatewayError::Upstream {
                code: error.code,
                message: error.message.clone(),
                data: error.data.clone(),
            });
        }
        response.result_as().map_err(|e| GatewayError::internal(e))
    }

    /// Forward a `prompts/get` request for the unprefixed prompt name and
    /// the original arguments, unmodified.
    pub async fn get_prompt(
        &self,
        prompt_name: &str,
        arguments: Option<serde_json::Value>,
    ) -> GatewayResult<mcp_core::messages::GetPromptResponse> {
        self.touch().await;
        let rpc = JsonRpcRequest::new(
            self.next_id().to_string(),
            "prompts/get",
            serde_json::to_value(mcp_core::messages::GetPromptRequest {
                name: prompt_name.to_string(),
                arguments,
            })
            .map_err(|e| GatewayError::internal(e))?,
        );
        let mut transport = self.transport.lock().await;
        let response = transport
            .send_request(rpc, Some(Duration::from_secs(30)))
            .await
            .map_err(GatewayError::Mcp)?;
        if let Some(error) = &response.error {
            return Err(GatewayError::Upstream {
                code: error.code,
                message: error.message.clone(),
                data: error.data.clone(),
            });
        }
        response.result_as().map_err(|e| GatewayError::internal(e))
    }

    /// Re-run discovery against the upstream, re-applying any
    /// `disabled_entries` overrides set since the last discovery.
    pub async fn refresh_catalog(&self) -> GatewayResult<()> {
        self.discover().await
    }

    /// Enable or disable one catalog entry without a full re-discovery:
    /// persists the override on the session's config and flips the
    /// cached record's `is_enabled` in place.
    pub async fn set_entry_enabled(&self, kind: CatalogEntryKind, name: &str, enabled: bool) {
        self.config.lock().await.set_entry_enabled(kind, name, enabled);

        let mut catalog = self.catalog.lock().await;
        match kind {
            CatalogEntryKind::Tool => {
                if let Some(t) = catalog.tools.iter_mut().find(|t| t.tool_name == name) {
                    t.is_enabled = enabled;
                }
            }
            CatalogEntryKind::Resource => {
                if let Some(r) = catalog.resources.iter_mut().find(|r| r.uri == name) {
                    r.is_enabled = enabled;
                }
            }
            CatalogEntryKind::Prompt => {
                if let Some(p) = catalog.prompts.iter_mut().find(|p| p.prompt_name == name) {
                    p.is_enabled = enabled;
                }
            }
        }
    }

    async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    /// Whether this session has had no activity for longer than the
    /// gateway's idle threshold.
    pub async fn is_idle(&self) -> bool {
        self.last_activity.lock().await.elapsed() >= IDLE_THRESHOLD
    }

    /// Whether the underlying transport reports itself connected.
    pub async fn is_healthy(&self) -> bool {
        self.transport.lock().await.is_connected()
    }
}
