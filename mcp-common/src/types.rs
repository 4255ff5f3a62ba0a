//! Entity types for the gateway's data model.
//!
//! These mirror `ServerConfig`/`ToolRecord`/`ResourceRecord`/`PromptRecord` as
//! described in the gateway's design: declarative records the configuration
//! layer owns and the Router reads, plus the per-capability records
//! discovered on an upstream's `*/list` calls. None of this is persisted by
//! this crate -- storage is an external concern.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Length of a [`ServerId`] in characters.
pub const SERVER_ID_LEN: usize = 8;

/// An 8 URL-safe-character opaque identifier for one upstream server.
///
/// Used verbatim as the namespace prefix for every tool/resource/prompt name
/// the Router exposes, so it is validated on construction to contain only
/// lowercase hex characters -- never an underscore -- keeping the
/// first-underscore split in [the Router] unambiguous against human-chosen
/// tool names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerId(String);

/// A [`ServerId`] was not exactly [`SERVER_ID_LEN`] lowercase hex characters.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid server id {0:?}: must be {SERVER_ID_LEN} lowercase hex characters")]
pub struct InvalidServerId(pub String);

impl ServerId {
    /// Generate a fresh id from a random UUIDv4, taking its first
    /// [`SERVER_ID_LEN`] hex digits (never contains a hyphen or underscore).
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(hex[..SERVER_ID_LEN].to_string())
    }

    /// Validate and wrap an existing string as a [`ServerId`].
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidServerId> {
        let raw = raw.into();
        if raw.len() == SERVER_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(InvalidServerId(raw))
        }
    }

    /// Borrow the id as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerId {
    type Error = InvalidServerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ServerId> for String {
    fn from(id: ServerId) -> Self {
        id.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which base runtime an upstream server is built on, selecting both a
/// default base image and how `install`/`start` commands are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuntimeKind {
    /// Node-based script runner (`npx`-style invocation).
    ScriptRunnerA,
    /// Python-based script runner (`uvx`-style invocation).
    ScriptRunnerB,
    /// A pre-built, pinned image supplied by the configuration layer.
    CustomImage,
}

impl RuntimeKind {
    /// Default base image used when building, unless the config pins a
    /// [`RuntimeKind::CustomImage`] reference instead.
    pub fn default_base_image(self) -> &'static str {
        match self {
            RuntimeKind::ScriptRunnerA => "node:20-slim",
            RuntimeKind::ScriptRunnerB => "python:3.12-slim",
            RuntimeKind::CustomImage => {
                unreachable!("CustomImage carries its own image reference, not a default")
            }
        }
    }
}

/// Which Transport variant wraps a server's upstream process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Line-delimited JSON over the container's attached stdio.
    Stdio,
    /// Plain HTTP POST per request/notification.
    Http,
    /// POST for requests, Server-Sent Events for responses/notifications.
    Sse,
}

/// Endpoint details for an http/sse-backed server. Absent for stdio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportEndpoint {
    /// The upstream's base URL.
    pub endpoint: String,
    /// Extra headers sent on every request (e.g. bearer tokens).
    #[serde(default)]
    pub extra_headers: Vec<(String, String)>,
}

/// One environment variable handed to an upstream container.
///
/// Rendered as `***` wherever a [`ServerConfig`] or its derived command line
/// is logged, when `is_secret` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Whether this value must be redacted in logs.
    #[serde(default)]
    pub is_secret: bool,
}

impl EnvVar {
    /// The value, or `***` if this variable is secret.
    pub fn redacted_value(&self) -> &str {
        if self.is_secret {
            "***"
        } else {
            &self.value
        }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.redacted_value())
    }
}

/// Build lifecycle of a server's container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    /// Not yet built; no image exists.
    Pending,
    /// Build in progress.
    Building,
    /// Build succeeded; the server's image is ready to run.
    Built,
    /// Build failed with the given reason.
    Failed {
        /// Human-readable failure reason (never raw container output).
        reason: String,
    },
}

/// A `BuildStatus` transition that is not allowed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid build status transition: {from:?} -> {to:?}")]
pub struct InvalidBuildTransition {
    from: BuildStatus,
    to: BuildStatus,
}

impl BuildStatus {
    /// Validate a transition from `self` to `next`.
    ///
    /// Allowed: `Pending -> Building`, `Building -> {Built, Failed}`, and a
    /// rebuild from either `Built` or `Failed` back to `Building`.
    pub fn validate_transition(&self, next: &BuildStatus) -> Result<(), InvalidBuildTransition> {
        use BuildStatus::*;
        let ok = matches!(
            (self, next),
            (Pending, Building) | (Building, Built) | (Building, Failed { .. })
        ) || matches!((self, next), (Built, Building) | (Failed { .. }, Building));
        if ok {
            Ok(())
        } else {
            Err(InvalidBuildTransition {
                from: self.clone(),
                to: next.clone(),
            })
        }
    }
}

/// Which catalog category a [`ServerConfig::disabled_entries`] key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEntryKind {
    Tool,
    Resource,
    Prompt,
}

impl fmt::Display for CatalogEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogEntryKind::Tool => "tool",
            CatalogEntryKind::Resource => "resource",
            CatalogEntryKind::Prompt => "prompt",
        };
        f.write_str(s)
    }
}

/// Declarative record for one upstream MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Short opaque identifier, used as routing prefix.
    pub id: ServerId,
    /// Human label, unique across the configuration store.
    pub name: String,
    /// Selects a base image and how install/start are interpreted.
    pub runtime_kind: RuntimeKind,
    /// When set, overrides `runtime_kind`'s default base image.
    #[serde(default)]
    pub custom_image: Option<String>,
    /// Free-form shell string run once inside the container before start, if any.
    #[serde(default)]
    pub install_command: Option<String>,
    /// Free-form shell string that runs as PID 1 inside the container.
    pub start_command: String,
    /// Ordered environment variables handed to the container.
    #[serde(default)]
    pub env: Vec<EnvVar>,
    /// Which Transport variant wraps this server.
    pub transport_kind: TransportKind,
    /// Endpoint details for http/sse; `None` for stdio.
    #[serde(default)]
    pub transport_config: Option<TransportEndpoint>,
    /// Current build lifecycle state.
    #[serde(default = "default_build_status")]
    pub build_status: BuildStatus,
    /// Set once `build_status` reaches `Built`.
    #[serde(default)]
    pub image_tag: Option<String>,
    /// Gate: inactive configs are invisible to the Router.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Qualified `"<kind>:<name>"` keys for catalog entries a management
    /// surface has disabled; absence means enabled. Persisted with the
    /// rest of this record, so overrides survive a gateway restart and
    /// are re-applied on every `discover()`.
    #[serde(default)]
    pub disabled_entries: HashSet<String>,
}

fn default_build_status() -> BuildStatus {
    BuildStatus::Pending
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    /// The deterministic image tag this server builds to.
    pub fn image_tag_for(server_id: &ServerId) -> String {
        format!("mcp-gateway/{server_id}:latest")
    }

    /// The base image to build from: `custom_image` if pinned, else the
    /// runtime kind's default.
    pub fn resolved_base_image(&self) -> &str {
        self.custom_image
            .as_deref()
            .unwrap_or_else(|| self.runtime_kind.default_base_image())
    }

    /// Render the environment list as `KEY=value` pairs with secrets redacted,
    /// safe to include in a log line.
    pub fn redacted_env(&self) -> Vec<String> {
        self.env.iter().map(|e| e.to_string()).collect()
    }

    /// Whether a management surface has disabled the named catalog entry.
    pub fn is_entry_disabled(&self, kind: CatalogEntryKind, name: &str) -> bool {
        self.disabled_entries.contains(&format!("{kind}:{name}"))
    }

    /// Enable or disable a catalog entry, persisted alongside this record.
    pub fn set_entry_enabled(&mut self, kind: CatalogEntryKind, name: &str, enabled: bool) {
        let key = format!("{kind}:{name}");
        if enabled {
            self.disabled_entries.remove(&key);
        } else {
            self.disabled_entries.insert(key);
        }
    }
}

/// One tool reported by an upstream during capability discovery.
///
/// Re-created on every successful discovery; `is_enabled` reflects the
/// owning `ServerConfig.disabled_entries` override at the moment of
/// discovery, so a management surface's choice survives the record being
/// replaced wholesale on the next `tools/list` against the upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRecord {
    /// The upstream server this tool belongs to.
    pub server_id: ServerId,
    /// The tool's name as advertised by the upstream (unprefixed).
    pub tool_name: String,
    /// Human description, if the upstream supplied one.
    pub description: Option<String>,
    /// JSON Schema object describing accepted arguments.
    pub input_schema: serde_json::Value,
    /// Per-tool override; defaults to enabled.
    pub is_enabled: bool,
}

impl ToolRecord {
    /// The namespaced name the Router exposes downstream.
    pub fn namespaced_name(&self) -> String {
        format!("{}_{}", self.server_id, self.tool_name)
    }
}

/// One resource reported by an upstream, generalizing [`ToolRecord`] to the
/// resource capability category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// The upstream server this resource belongs to.
    pub server_id: ServerId,
    /// The resource's URI as advertised by the upstream (unprefixed).
    pub uri: String,
    /// Human name, if the upstream supplied one.
    pub name: Option<String>,
    /// Human description, if the upstream supplied one.
    pub description: Option<String>,
    /// MIME type, if the upstream supplied one.
    pub mime_type: Option<String>,
    /// Per-resource override; defaults to enabled.
    pub is_enabled: bool,
}

impl ResourceRecord {
    /// The namespaced URI the Router exposes downstream.
    pub fn namespaced_uri(&self) -> String {
        format!("{}://{}", self.server_id, self.uri)
    }
}

/// One prompt reported by an upstream, generalizing [`ToolRecord`] to the
/// prompt capability category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    /// The upstream server this prompt belongs to.
    pub server_id: ServerId,
    /// The prompt's name as advertised by the upstream (unprefixed).
    pub prompt_name: String,
    /// Human description, if the upstream supplied one.
    pub description: Option<String>,
    /// JSON Schema-like argument descriptors, opaque to the gateway.
    pub arguments: serde_json::Value,
    /// Per-prompt override; defaults to enabled.
    pub is_enabled: bool,
}

impl PromptRecord {
    /// The namespaced name the Router exposes downstream.
    pub fn namespaced_name(&self) -> String {
        format!("{}_{}", self.server_id, self.prompt_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_id_generate_is_hex_and_no_underscore() {
        let id = ServerId::generate();
        assert_eq!(id.as_str().len(), SERVER_ID_LEN);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(!id.as_str().contains('_'));
    }

    #[test]
    fn server_id_rejects_wrong_length() {
        assert!(ServerId::parse("short").is_err());
        assert!(ServerId::parse("toolongbyfar").is_err());
    }

    #[test]
    fn server_id_rejects_non_hex() {
        assert!(ServerId::parse("zzzzzzzz").is_err());
        assert!(ServerId::parse("aaaa_bbb").is_err());
    }

    #[test]
    fn env_var_redacts_secret() {
        let secret = EnvVar {
            key: "TOKEN".into(),
            value: "s3cr3t".into(),
            is_secret: true,
        };
        assert_eq!(secret.redacted_value(), "***");
        assert_eq!(secret.to_string(), "TOKEN=***");

        let plain = EnvVar {
            key: "MODE".into(),
            value: "prod".into(),
            is_secret: false,
        };
        assert_eq!(plain.to_string(), "MODE=prod");
    }

    #[test]
    fn build_status_transitions() {
        let pending = BuildStatus::Pending;
        assert!(pending.validate_transition(&BuildStatus::Building).is_ok());
        assert!(pending.validate_transition(&BuildStatus::Built).is_err());

        let building = BuildStatus::Building;
        assert!(building.validate_transition(&BuildStatus::Built).is_ok());
        assert!(building
            .validate_transition(&BuildStatus::Failed {
                reason: "boom".into()
            })
            .is_ok());

        let failed = BuildStatus::Failed {
            reason: "boom".into(),
        };
        assert!(failed.validate_transition(&BuildStatus::Building).is_ok());
        assert!(failed.validate_transition(&BuildStatus::Built).is_err());
    }

    #[test]
    fn tool_record_namespacing() {
        let tool = ToolRecord {
            server_id: ServerId::parse("aaaaaaaa").unwrap(),
            tool_name: "echo".into(),
            description: None,
            input_schema: serde_json::json!({}),
            is_enabled: true,
        };
        assert_eq!(tool.namespaced_name(), "aaaaaaaa_echo");
    }

    #[test]
    fn resource_record_namespacing() {
        let resource = ResourceRecord {
            server_id: ServerId::parse("bbbbbbbb").unwrap(),
            uri: "file:///tmp/x".into(),
            name: None,
            description: None,
            mime_type: None,
            is_enabled: true,
        };
        assert_eq!(resource.namespaced_uri(), "bbbbbbbb://file:///tmp/x");
    }

    #[test]
    fn image_tag_is_deterministic() {
        let id = ServerId::parse("cafebabe").unwrap();
        assert_eq!(
            ServerConfig::image_tag_for(&id),
            "mcp-gateway/cafebabe:latest"
        );
    }
}
