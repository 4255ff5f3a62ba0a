//! Hand-built `ServerConfig`/`ToolRecord` fixtures, and a zero-server
//! [`Gateway`] builder, used to drive the downstream dispatch path without
//! a live container runtime.

use mcp_common::{RuntimeKind, ServerConfig, ServerId, TransportKind};
use mcp_transport::{Gateway, GatewayConfig};

/// A minimal, inactive-by-default stdio server config. Tests that need a
/// specific id or name should mutate the returned value.
pub fn stub_server_config(id: &str, name: &str) -> ServerConfig {
    ServerConfig {
        id: ServerId::parse(id.to_string()).expect("test id must be 8 hex chars"),
        name: name.to_string(),
        runtime_kind: RuntimeKind::ScriptRunnerA,
        custom_image: None,
        install_command: None,
        start_command: "node server.js".to_string(),
        env: Vec::new(),
        transport_kind: TransportKind::Stdio,
        transport_config: None,
        build_status: mcp_common::BuildStatus::Pending,
        image_tag: None,
        is_active: true,
        disabled_entries: std::collections::HashSet::new(),
    }
}

/// A Gateway with no configured servers, backed by a Container Supervisor
/// that never dials the real Docker daemon (construction alone performs no
/// I/O). Enough to exercise the handshake and gateway-internal-tool paths
/// through `downstream::handle_message` without a container runtime.
pub fn empty_gateway() -> Gateway {
    let config = GatewayConfig {
        data_dir: std::env::temp_dir(),
        servers: Vec::new(),
        ..GatewayConfig::default()
    };
    Gateway::new(config).expect("gateway construction performs no container I/O")
}
