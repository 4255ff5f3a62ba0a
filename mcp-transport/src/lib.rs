//! Gateway runtime: Session Manager, Router, and Container Supervisor
//! wired together behind one explicit value, per the design note
//! replacing the teacher's process-global singletons with an owned
//! [`Gateway`] the downstream adapters and CLI hold directly.

pub mod config;
pub mod container;
pub mod downstream;
pub mod error;
pub mod router;
pub mod session;
pub mod session_manager;
pub mod transport_registry;

pub use config::GatewayConfig;
pub use container::ContainerSupervisor;
pub use error::{GatewayError, GatewayResult};
pub use router::{GatewaySession, GatewayState, MergedCatalog, Router};
pub use session::{Catalog, Session};
pub use session_manager::SessionManager;
pub use transport_registry::{DialSpec, TransportRegistry};

use mcp_common::ServerConfig;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The whole runtime plane: owns the Session Manager, Router, and
/// Container Supervisor for one running gateway process.
pub struct Gateway {
    config: RwLock<GatewayConfig>,
    router: Router,
    sessions: Arc<SessionManager>,
    supervisor: Arc<ContainerSupervisor>,
}

impl Gateway {
    /// Build a Gateway from configuration: connects to the container
    /// engine, builds a Transport Registry and Session Manager, and a
    /// Router over them. Does not start any upstream server; those are
    /// created lazily on first use.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let supervisor = Arc::new(ContainerSupervisor::connect(&config.container_socket)?);
        let registry = Arc::new(TransportRegistry::new());
        let sessions = Arc::new(SessionManager::new(supervisor.clone(), registry));
        let router = Router::new(sessions.clone());

        Ok(Self {
            config: RwLock::new(config),
            router,
            sessions,
            supervisor,
        })
    }

    /// Build a Gateway for `connect` mode: wires up the same Router/Session
    /// Manager/Container Supervisor, but Sessions only ever exec into
    /// containers the caller asserts are already running. No image is
    /// built and no container is started or recreated.
    pub fn attach(config: GatewayConfig) -> GatewayResult<Self> {
        let supervisor = Arc::new(ContainerSupervisor::connect(&config.container_socket)?);
        let registry = Arc::new(TransportRegistry::new());
        let sessions = Arc::new(SessionManager::attach_only(supervisor.clone(), registry));
        let router = Router::new(sessions.clone());

        Ok(Self {
            config: RwLock::new(config),
            router,
            sessions,
            supervisor,
        })
    }

    /// Start the background idle-session eviction worker.
    pub fn spawn_background_workers(&self) -> tokio::task::JoinHandle<()> {
        self.sessions.spawn_eviction_loop()
    }

    /// Snapshot of the currently configured servers.
    pub async fn servers(&self) -> Vec<ServerConfig> {
        self.config.read().await.servers.clone()
    }

    /// The Router, for use by downstream adapters.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The Container Supervisor, for build/reset operations driven by the
    /// CLI outside of normal request dispatch.
    pub fn supervisor(&self) -> &Arc<ContainerSupervisor> {
        &self.supervisor
    }

    /// Tear down every session and release container resources. Called on
    /// graceful shutdown (SIGINT) so no `mcp-`-prefixed container is
    /// leaked across a gateway restart.
    pub async fn shutdown(&self) {
        self.sessions.cleanup_all().await;
    }
}
