//! Gateway configuration loading.
//!
//! Grounded in `mcp_core::transport::config::TransportConfig::from_file`'s
//! extension-sniffing pattern and the teacher's `toml`/`serde_yaml`
//! dependencies. The gateway reads a single `gateway.toml` (or `.yaml`/
//! `.json`) from its data directory at startup; every field is overridable
//! by an `MCP_GATEWAY_`-prefixed environment variable.

use mcp_common::ServerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Directory holding persisted state (servers, tools, etc.).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Bind host for `serve http`/`serve stdio`'s management surface.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for `serve http`/`serve stdio`'s management surface.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the container engine's control socket.
    #[serde(default = "default_container_socket")]
    pub container_socket: String,

    /// Declarative server configurations the Router and Session Manager read.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,

    /// Default base image per runtime kind, keyed by the kind's tag.
    #[serde(default)]
    pub default_images: HashMap<String, String>,

    /// Timeout for container build/run/exec/stop operations.
    #[serde(with = "humantime_serde", default = "default_container_timeout")]
    pub container_timeout: Duration,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`), or an
    /// `EnvFilter`-compatible directive string.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `"pretty"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_container_socket() -> String {
    if cfg!(windows) {
        "npipe:////./pipe/docker_engine".to_string()
    } else {
        "unix:///var/run/docker.sock".to_string()
    }
}

fn default_container_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            host: default_host(),
            port: default_port(),
            container_socket: default_container_socket(),
            servers: Vec::new(),
            default_images: HashMap::new(),
            container_timeout: default_container_timeout(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Errors loading or parsing a [`GatewayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file's extension is not one of `.toml`/`.yaml`/`.yml`/`.json`.
    #[error("unsupported config file extension for {0}")]
    UnsupportedExtension(PathBuf),

    /// The config file could not be parsed as its detected format.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: anyhow::Error,
    },
}

impl GatewayConfig {
    /// Load configuration from `path`, falling back to documented defaults
    /// when the file is absent, then applying `MCP_GATEWAY_`-prefixed
    /// environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e.into(),
            }),
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: e.into(),
                })
            }
            "json" => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e.into(),
            }),
            _ => Err(ConfigError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MCP_GATEWAY_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_CONTAINER_SOCKET") {
            self.container_socket = v;
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_LOG_FORMAT") {
            self.log_format = v;
        }
        if let Ok(v) = std::env::var("MCP_GATEWAY_CONTAINER_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.container_timeout = Duration::from_secs(secs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.servers.is_empty());
        assert_eq!(config.container_timeout, Duration::from_secs(300));
    }

    #[test]
    fn load_falls_back_to_defaults_when_absent() {
        let config = GatewayConfig::load(Path::new("/nonexistent/gateway.toml")).unwrap();
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn load_parses_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "host = \"0.0.0.0\"\nport = 9000\n").unwrap();

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.ini");
        std::fs::write(&path, "host = 0.0.0.0").unwrap();

        assert!(matches!(
            GatewayConfig::load(&path),
            Err(ConfigError::UnsupportedExtension(_))
        ));
    }
}
