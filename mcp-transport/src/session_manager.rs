//! Session Manager: lazily create Sessions, evict idle ones, and tear
//! everything down on shutdown.
//!
//! Grounded on `mcp-transport/src/proxy.rs`'s single-process ownership
//! pattern, generalized to a map of Sessions with in-flight-creation
//! coalescing so concurrent first-use requests for the same server don't
//! each start a redundant container.

use crate::container::ContainerSupervisor;
use crate::error::{GatewayError, GatewayResult};
use crate::session::Session;
use crate::transport_registry::TransportRegistry;
use mcp_common::{CatalogEntryKind, ServerConfig, ServerId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

enum Slot {
    Creating(Arc<Notify>),
    Ready(Arc<Session>),
}

/// Whether a manager's Sessions build/run their container on first use, or
/// attach to one the caller asserts is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartMode {
    BuildAndRun,
    AttachOnly,
}

/// Owns every live [`Session`], creating them on first use and evicting
/// idle ones on a background tick.
pub struct SessionManager {
    sessions: Mutex<HashMap<ServerId, Slot>>,
    supervisor: Arc<ContainerSupervisor>,
    registry: Arc<TransportRegistry>,
    start_mode: StartMode,
}

impl SessionManager {
    /// Build a manager sharing the given container supervisor and
    /// transport registry; first use of a server builds and runs its
    /// container.
    pub fn new(supervisor: Arc<ContainerSupervisor>, registry: Arc<TransportRegistry>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            supervisor,
            registry,
            start_mode: StartMode::BuildAndRun,
        }
    }

    /// Build a manager whose Sessions only ever exec into already-running
    /// containers; first use never builds an image or starts a container.
    pub fn attach_only(supervisor: Arc<ContainerSupervisor>, registry: Arc<TransportRegistry>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            supervisor,
            registry,
            start_mode: StartMode::AttachOnly,
        }
    }

    /// Return the live session for `config.id`, creating it if this is
    /// the first request for that server. Concurrent callers for the
    /// same server id coalesce onto the single in-flight creation rather
    /// than each starting their own container.
    pub async fn get_or_create(&self, config: &ServerConfig) -> GatewayResult<Arc<Session>> {
        loop {
            let notify = {
                let mut sessions = self.sessions.lock().await;
                match sessions.get(&config.id) {
                    Some(Slot::Ready(session)) => return Ok(session.clone()),
                    Some(Slot::Creating(notify)) => notify.clone(),
                    None => {
                        let notify = Arc::new(Notify::new());
                        sessions.insert(config.id.clone(), Slot::Creating(notify));
                        break;
                    }
                }
            };
            notify.notified().await;
        }

        let result = match self.start_mode {
            StartMode::BuildAndRun => Session::start(config, &self.supervisor, &self.registry).await,
            StartMode::AttachOnly => Session::attach(config, &self.supervisor, &self.registry).await,
        };
        let mut sessions = self.sessions.lock().await;
        match result {
            Ok(session) => {
                let session = Arc::new(session);
                sessions.insert(config.id.clone(), Slot::Ready(session.clone()));
                info!(server_id = %config.id, "session created");
                Ok(session)
            }
            Err(e) => {
                if let Some(Slot::Creating(notify)) = sessions.remove(&config.id) {
                    notify.notify_waiters();
                }
                warn!(server_id = %config.id, error = %e, "session creation failed");
                Err(e)
            }
        }
    }

    /// Toggle a catalog entry on the already-live session for `server_id`,
    /// without creating one if it isn't running. Returns `UnknownServer`
    /// if no session is currently live for that id.
    pub async fn set_entry_enabled(
        &self,
        server_id: &ServerId,
        kind: CatalogEntryKind,
        name: &str,
        enabled: bool,
    ) -> GatewayResult<()> {
        let session = {
            let sessions = self.sessions.lock().await;
            match sessions.get(server_id) {
                Some(Slot::Ready(session)) => session.clone(),
                _ => {
                    return Err(GatewayError::UnknownServer {
                        server_id: server_id.clone(),
                    })
                }
            }
        };
        session.set_entry_enabled(kind, name, enabled).await;
        Ok(())
    }

    /// Tear down and remove the session for `server_id`, if present.
    pub async fn disconnect(&self, server_id: &ServerId) -> GatewayResult<()> {
        let removed = self.sessions.lock().await.remove(server_id);
        if removed.is_some() {
            self.registry.remove(server_id).await;
            self.supervisor.stop(server_id).await?;
            info!(%server_id, "session disconnected");
        }
        Ok(())
    }

    /// Tear down every session, for gateway shutdown.
    pub async fn cleanup_all(&self) {
        let ids: Vec<ServerId> = {
            let sessions = self.sessions.lock().await;
            sessions.keys().cloned().collect()
        };
        for id in ids {
            if let Err(e) = self.disconnect(&id).await {
                warn!(server_id = %id, error = %e, "error during shutdown cleanup");
            }
        }
    }

    /// Evict every session idle past the threshold. Intended to run on a
    /// periodic background tick (see [`Self::spawn_eviction_loop`]); does
    /// not cancel a session's in-flight request, it only stops tracking
    /// sessions with no recent activity.
    pub async fn evict_idle(&self) {
        let idle_ids: Vec<ServerId> = {
            let sessions = self.sessions.lock().await;
            let mut ids = Vec::new();
            for (id, slot) in sessions.iter() {
                if let Slot::Ready(session) = slot {
                    if session.is_idle().await {
                        ids.push(id.clone());
                    }
                }
            }
            ids
        };
        for id in idle_ids {
            info!(server_id = %id, "evicting idle session");
            if let Err(e) = self.disconnect(&id).await {
                warn!(server_id = %id, error = %e, "error evicting idle session");
            }
        }
    }

    /// Spawn a background task that calls [`Self::evict_idle`] every
    /// [`EVICTION_INTERVAL`], for the lifetime of `self`.
    pub fn spawn_eviction_loop(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
            loop {
                ticker.tick().await;
                manager.evict_idle().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_on_unknown_server_is_a_noop() {
        let supervisor = Arc::new(
            ContainerSupervisor::connect("unix:///var/run/docker.sock")
                .expect("socket uri parses even without a daemon present"),
        );
        let registry = Arc::new(TransportRegistry::new());
        let manager = SessionManager::new(supervisor, registry);
        manager.disconnect(&ServerId::generate()).await.unwrap();
    }
}
