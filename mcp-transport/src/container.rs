//! Container Supervisor: build, run, exec into, and stop the sandboxes
//! that host upstream MCP servers.
//!
//! Grounded on `mcp-transport/src/proxy.rs`'s `start_mcp_server`, which
//! spawned a host child process; here the same lifecycle responsibility
//! (start, track, stop) is reworked onto `bollard` so `start_command`
//! always runs as a container's PID 1 rather than a gateway-process child,
//! per the resolved host-vs-container open question.

use crate::error::{GatewayError, GatewayResult};
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures::StreamExt;
use mcp_common::{BuildStatus, InvalidBuildTransition, ServerConfig, ServerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

fn container_name(server_id: &ServerId) -> String {
    format!("mcp-{server_id}")
}

/// Default memory limit for upstream containers, in bytes (512 MiB).
pub const DEFAULT_MEMORY_BYTES: i64 = 512 * 1024 * 1024;
/// Default CPU quota for upstream containers, as a fraction of one core.
pub const DEFAULT_CPU_QUOTA: f64 = 0.5;

/// Owns the container engine connection and per-server build status.
pub struct ContainerSupervisor {
    docker: Docker,
    build_status: Mutex<HashMap<ServerId, BuildStatus>>,
}

impl ContainerSupervisor {
    /// Connect to the container engine at `socket` (a `unix://` or
    /// `npipe://` URI, per [`crate::config::GatewayConfig::container_socket`]).
    pub fn connect(socket: &str) -> GatewayResult<Self> {
        let docker = Docker::connect_with_socket(socket, 120, bollard::API_DEFAULT_VERSION)
            .map_err(GatewayError::Container)?;
        Ok(Self {
            docker,
            build_status: Mutex::new(HashMap::new()),
        })
    }

    async fn transition(&self, server_id: &ServerId, next: BuildStatus) -> GatewayResult<()> {
        let mut statuses = self.build_status.lock().await;
        let current = statuses
            .get(server_id)
            .cloned()
            .unwrap_or(BuildStatus::Pending);
        current
            .validate_transition(&next)
            .map_err(|e: InvalidBuildTransition| GatewayError::internal(e))?;
        statuses.insert(server_id.clone(), next);
        Ok(())
    }

    /// Current build status for a server, defaulting to `Pending` if never built.
    pub async fn build_status(&self, server_id: &ServerId) -> BuildStatus {
        self.build_status
            .lock()
            .await
            .get(server_id)
            .cloned()
            .unwrap_or(BuildStatus::Pending)
    }

    /// Pull the server's base image and record it under the deterministic
    /// tag `mcp-gateway/<server_id>:latest`. A rebuild is triggered on
    /// every call; callers decide when a config edit warrants one.
    pub async fn build(&self, config: &ServerConfig) -> GatewayResult<String> {
        let server_id = &config.id;
        self.transition(server_id, BuildStatus::Building).await?;

        let base_image = config.resolved_base_image().to_string();
        let tag = ServerConfig::image_tag_for(server_id);

        let result = self.pull_image(&base_image).await;
        match result {
            Ok(()) => {
                self.transition(server_id, BuildStatus::Built).await?;
                info!(%server_id, %tag, "image ready");
                Ok(tag)
            }
            Err(e) => {
                let reason = e.to_string();
                self.transition(server_id, BuildStatus::Failed { reason: reason.clone() })
                    .await?;
                warn!(%server_id, %reason, "image build failed");
                Err(e)
            }
        }
    }

    async fn pull_image(&self, image: &str) -> GatewayResult<()> {
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });
        let mut stream = self.docker.create_image(options, None, None);
        while let Some(update) = stream.next().await {
            update.map_err(GatewayError::Container)?;
        }
        Ok(())
    }

    /// Start (or restart) the container hosting `config`'s upstream server.
    ///
    /// Stops and removes any pre-existing container under the same name
    /// first. Stdio transports get an interactive, attached stdin;
    /// http/sse transports run detached with their port published.
    pub async fn run(&self, config: &ServerConfig) -> GatewayResult<()> {
        let server_id = &config.id;
        let name = container_name(server_id);

        self.remove_if_exists(&name).await?;

        if matches!(self.build_status(server_id).await, BuildStatus::Built) {
            // already built, nothing to do
        } else {
            self.build(config).await?;
        }

        let image = config
            .image_tag
            .clone()
            .unwrap_or_else(|| config.resolved_base_image().to_string());

        let env: Vec<String> = config
            .env
            .iter()
            .map(|e| format!("{}={}", e.key, e.value))
            .collect();

        let is_stdio = matches!(config.transport_kind, mcp_common::TransportKind::Stdio);

        let host_config = bollard::models::HostConfig {
            memory: Some(DEFAULT_MEMORY_BYTES),
            nano_cpus: Some((DEFAULT_CPU_QUOTA * 1_000_000_000.0) as i64),
            ..Default::default()
        };

        let container_config = Config {
            image: Some(image),
            env: Some(env),
            cmd: Some(shell_words(&config.start_command)),
            tty: Some(false),
            attach_stdin: Some(is_stdio),
            attach_stdout: Some(is_stdio),
            attach_stderr: Some(true),
            open_stdin: Some(is_stdio),
            host_config: Some(host_config),
            ..Default::default()
        };

        self.docker
            .create_container(
                Some(CreateContainerOptions {
                    name: name.clone(),
                    platform: None,
                }),
                container_config,
            )
            .await
            .map_err(GatewayError::Container)?;

        self.docker
            .start_container(&name, None::<StartContainerOptions<String>>)
            .await
            .map_err(GatewayError::Container)?;

        info!(%server_id, container = %name, "container started");
        Ok(())
    }

    async fn remove_if_exists(&self, name: &str) -> GatewayResult<()> {
        let stop_result = self
            .docker
            .stop_container(name, Some(StopContainerOptions { t: 5 }))
            .await;
        if let Err(e) = stop_result {
            if !is_not_found(&e) {
                return Err(GatewayError::Container(e));
            }
        }

        let remove_result = self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;
        if let Err(e) = remove_result {
            if !is_not_found(&e) {
                return Err(GatewayError::Container(e));
            }
        }
        Ok(())
    }

    /// Run `install_command` inside the already-started container via
    /// `docker exec` and wait for it to finish.
    pub async fn exec_install(&self, server_id: &ServerId, install_command: &str) -> GatewayResult<()> {
        let name = container_name(server_id);
        let exec = self
            .docker
            .create_exec(
                &name,
                CreateExecOptions {
                    cmd: Some(shell_words(install_command)),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(GatewayError::Container)?;

        if let StartExecResults::Attached { mut output, .. } = self
            .docker
            .start_exec(&exec.id, None)
            .await
            .map_err(GatewayError::Container)?
        {
            while let Some(chunk) = output.next().await {
                chunk.map_err(GatewayError::Container)?;
            }
        }
        Ok(())
    }

    /// Build the argv for attaching to an already-running container's
    /// stdio stream via `docker exec -i`, execing `start_command` so the
    /// gateway's stdio transport talks to the real upstream server rather
    /// than a placeholder pipe. Used by `connect` mode and by stdio
    /// sessions.
    pub fn stdio_exec_argv(&self, server_id: &ServerId, start_command: &str) -> Vec<String> {
        vec![
            "docker".to_string(),
            "exec".to_string(),
            "-i".to_string(),
            container_name(server_id),
            "sh".to_string(),
            "-c".to_string(),
            start_command.to_string(),
        ]
    }

    /// Gracefully stop, then force-remove, the container for `server_id`.
    pub async fn stop(&self, server_id: &ServerId) -> GatewayResult<()> {
        self.remove_if_exists(&container_name(server_id)).await
    }
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }
    )
}

fn shell_words(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Gateway-internal wrapper pairing a supervisor with a shared handle,
/// used by the Session Manager to share one Docker connection across
/// every Session it creates.
pub type SharedSupervisor = Arc<ContainerSupervisor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_name_is_prefixed() {
        let id = ServerId::generate();
        assert!(container_name(&id).starts_with("mcp-"));
    }

    #[test]
    fn shell_words_splits_on_whitespace() {
        assert_eq!(
            shell_words("npm run start"),
            vec!["npm".to_string(), "run".to_string(), "start".to_string()]
        );
    }

    #[test]
    fn default_resource_limits_match_spec() {
        assert_eq!(DEFAULT_MEMORY_BYTES, 512 * 1024 * 1024);
        assert_eq!(DEFAULT_CPU_QUOTA, 0.5);
    }
}
