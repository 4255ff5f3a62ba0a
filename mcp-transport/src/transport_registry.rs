//! Transport Registry: the gateway's keyed map of live upstream transports.
//!
//! Grounded on `mcp-transport/src/proxy.rs`'s single-transport lifecycle
//! management, generalized to a registry keyed by [`ServerId`] so the
//! Session Manager can hold one live [`Transport`] per upstream server
//! rather than one per process.

use crate::error::{GatewayError, GatewayResult};
use mcp_common::{ServerId, TransportKind};
use mcp_core::transport::{StdioConfig, Transport, TransportConfig, TransportFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Parameters needed to dial a particular upstream server's transport.
///
/// For `Stdio`, the command is always `docker exec -i <container>` or
/// `docker run --rm -i <image> <start_command>`; the Container Supervisor
/// builds this before handing it to the registry. For `Http`/`Sse`, `target`
/// is the endpoint URL the container publishes.
#[derive(Debug, Clone)]
pub struct DialSpec {
    /// Which wire format to speak.
    pub kind: TransportKind,
    /// `Stdio`: the argv to launch. `Http`/`Sse`: a single-element vec
    /// holding the endpoint URL.
    pub target: Vec<String>,
}

impl DialSpec {
    fn into_transport_config(self) -> GatewayResult<TransportConfig> {
        match self.kind {
            TransportKind::Stdio => {
                let (command, args) = self
                    .target
                    .split_first()
                    .ok_or_else(|| GatewayError::internal("empty stdio dial target"))?;
                Ok(TransportConfig::Stdio(StdioConfig {
                    command: command.clone(),
                    args: args.to_vec(),
                    working_dir: None,
                    timeout: std::time::Duration::from_secs(30),
                    environment: HashMap::new(),
                }))
            }
            TransportKind::Http => {
                let url = self
                    .target
                    .first()
                    .ok_or_else(|| GatewayError::internal("empty http dial target"))?;
                TransportConfig::http_stream(url).map_err(GatewayError::Mcp)
            }
            TransportKind::Sse => {
                let url = self
                    .target
                    .first()
                    .ok_or_else(|| GatewayError::internal("empty sse dial target"))?;
                TransportConfig::http_sse(url).map_err(GatewayError::Mcp)
            }
        }
    }
}

/// Keyed registry of live [`Transport`]s, one per upstream server.
///
/// Mirrors the connection-tracking role `mcp-transport/src/proxy.rs`'s
/// `MCPProxy` played for its single child process, but keyed so the
/// Session Manager can look transports up by [`ServerId`].
pub struct TransportRegistry {
    transports: Mutex<HashMap<ServerId, Arc<Mutex<Box<dyn Transport>>>>>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            transports: Mutex::new(HashMap::new()),
        }
    }

    /// Create and connect a new transport for `server_id`, replacing and
    /// disconnecting any prior transport registered for the same id.
    pub async fn create(
        &self,
        server_id: &ServerId,
        dial: DialSpec,
    ) -> GatewayResult<Arc<Mutex<Box<dyn Transport>>>> {
        self.remove(server_id).await;

        let config = dial.into_transport_config()?;
        let mut transport = TransportFactory::create(config).await.map_err(|e| {
            warn!(%server_id, error = %e, "transport creation failed");
            GatewayError::Mcp(e)
        })?;
        transport.connect().await.map_err(GatewayError::Mcp)?;

        let handle: Arc<Mutex<Box<dyn Transport>>> = Arc::new(Mutex::new(transport));
        self.transports
            .lock()
            .await
            .insert(server_id.clone(), handle.clone());
        info!(%server_id, "transport registered");
        Ok(handle)
    }

    /// Look up the live transport for `server_id`, if any.
    pub async fn get(&self, server_id: &ServerId) -> Option<Arc<Mutex<Box<dyn Transport>>>> {
        self.transports.lock().await.get(server_id).cloned()
    }

    /// Disconnect and remove the transport for `server_id`, if present.
    pub async fn remove(&self, server_id: &ServerId) {
        if let Some(handle) = self.transports.lock().await.remove(server_id) {
            let mut transport = handle.lock().await;
            if let Err(e) = transport.disconnect().await {
                warn!(%server_id, error = %e, "error disconnecting transport during removal");
            }
            debug!(%server_id, "transport removed");
        }
    }

    /// Disconnect and remove every registered transport.
    pub async fn remove_all(&self) {
        let ids: Vec<ServerId> = self.transports.lock().await.keys().cloned().collect();
        for id in ids {
            self.remove(&id).await;
        }
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> ServerId {
        ServerId::generate()
    }

    #[tokio::test]
    async fn get_on_empty_registry_returns_none() {
        let registry = TransportRegistry::new();
        assert!(registry.get(&sid()).await.is_none());
    }

    #[tokio::test]
    async fn remove_on_empty_registry_is_a_noop() {
        let registry = TransportRegistry::new();
        registry.remove(&sid()).await;
    }

    #[tokio::test]
    async fn create_rejects_empty_stdio_target() {
        let registry = TransportRegistry::new();
        let dial = DialSpec {
            kind: TransportKind::Stdio,
            target: vec![],
        };
        let err = registry.create(&sid(), dial).await.unwrap_err();
        assert!(matches!(err, GatewayError::Internal { .. }));
    }
}
