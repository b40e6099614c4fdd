use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use huddle::server::{HeartbeatConfig, RelayConfig, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", version, about = "Signaling relay for small video calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    #[arg(long, env = "HUDDLE_ADDR", default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// Participants allowed per room; 0 removes the limit.
    #[arg(long, env = "HUDDLE_MAX_PARTICIPANTS", default_value_t = 8)]
    max_participants: usize,

    #[arg(long, env = "HUDDLE_HEARTBEAT_INTERVAL_SECS", default_value_t = 25)]
    heartbeat_interval_secs: u64,

    #[arg(long, env = "HUDDLE_HEARTBEAT_TIMEOUT_SECS", default_value_t = 60)]
    heartbeat_timeout_secs: u64,

    /// Accepted auth tokens (comma-separated). Leave empty to disable auth.
    #[arg(long, env = "HUDDLE_AUTH_TOKENS", value_delimiter = ',')]
    auth_tokens: Vec<String>,

    /// Directory with the web client, served under `/`.
    #[arg(long, env = "HUDDLE_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            relay: RelayConfig {
                max_participants: (self.max_participants > 0).then_some(self.max_participants),
                heartbeat: HeartbeatConfig {
                    interval: Duration::from_secs(self.heartbeat_interval_secs),
                    timeout: Duration::from_secs(self.heartbeat_timeout_secs),
                },
            },
            auth_tokens: self
                .auth_tokens
                .iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { command } = Cli::parse();

    match command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.server_config();
    let (_relay, app) = huddle::server::app(&config).context("Invalid server configuration")?;

    println!("{}", "Starting huddle signaling server...".green().bold());
    println!("   WebSocket: ws://{}/ws", config.addr);
    println!("   Health:    http://{}/health", config.addr);
    if let Some(dir) = &config.static_dir {
        println!("   Static:    {}", dir.display());
    }
    if !config.auth_tokens.is_empty() {
        println!("   {}", "Token authentication enabled".cyan());
    }

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Signaling server listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
