use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mcp_transport::{downstream, Gateway, GatewayConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "Aggregates upstream MCP servers behind one unified protocol surface")]
#[command(version = "0.2.0")]
pub struct Cli {
    /// Path to the gateway config file (toml/yaml/json).
    #[arg(long, global = true, default_value = "gateway.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway, exposing MCP over one of the downstream transports.
    Serve {
        #[command(subcommand)]
        mode: ServeMode,
    },
    /// Lightweight stdio-only mode: attach to already-running containers
    /// via exec, no builds, no UI, no stdout logging.
    Connect,
    /// Delete the gateway's data directory.
    Reset {
        /// Must be passed to actually perform the deletion.
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub enum ServeMode {
    /// Expose MCP over HTTP at `/mcp`.
    Http {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Expose MCP over stdio.
    Stdio {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn init_logging(stderr_only: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if stderr_only {
        // `serve stdio` and `connect` speak MCP on stdout; logging must
        // never share that stream.
        subscriber.with_writer(std::io::stderr).init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "gateway exited with an error");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { mode } => {
            init_logging(matches!(mode, ServeMode::Stdio { .. }));
            let config = GatewayConfig::load(&cli.config)
                .with_context(|| format!("loading config from {}", cli.config.display()))?;
            let gateway = Gateway::new(config).context("initializing gateway runtime")?;
            gateway.spawn_background_workers();

            match mode {
                ServeMode::Http { host, port } => {
                    let gateway = Arc::new(gateway);
                    run_until_signal(gateway.clone(), downstream::http::serve(gateway, &host, port))
                        .await
                }
                ServeMode::Stdio { .. } => {
                    let gateway = Arc::new(gateway);
                    run_until_signal(gateway.clone(), async {
                        downstream::stdio::serve(&gateway).await
                    })
                    .await
                }
            }
        }
        Commands::Connect => {
            init_logging(true);
            let config = GatewayConfig::load(&cli.config)
                .with_context(|| format!("loading config from {}", cli.config.display()))?;
            let gateway = Arc::new(Gateway::attach(config).context("initializing gateway runtime")?);
            run_until_signal(gateway.clone(), async {
                downstream::stdio::serve(&gateway).await
            })
            .await
        }
        Commands::Reset { confirm } => {
            init_logging(false);
            if !confirm {
                anyhow::bail!("refusing to delete the data directory without --confirm");
            }
            let config = GatewayConfig::load(&cli.config)
                .with_context(|| format!("loading config from {}", cli.config.display()))?;
            if config.data_dir.exists() {
                std::fs::remove_dir_all(&config.data_dir).with_context(|| {
                    format!("removing data directory {}", config.data_dir.display())
                })?;
            }
            tracing::info!(data_dir = %config.data_dir.display(), "data directory reset");
            Ok(())
        }
    }
}

/// Run `body` to completion, but shut the gateway down cleanly and exit
/// 130 if SIGINT arrives first.
async fn run_until_signal<F>(gateway: Arc<Gateway>, body: F) -> Result<()>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = body => {
            result.context("downstream adapter exited")?;
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
            gateway.shutdown().await;
            std::process::exit(130);
        }
    }
}
