//! Subdomain Reverse Proxy
//!
//! Routes each request by host name to a backend chosen from a per-subdomain
//! pool, then streams the backend's response back.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                SUBDOMAIN PROXY                   │
//!     Client Request      │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!     ────────────────────┼─▶│  http  │──▶│ routing  │──▶│ load_balancer │   │
//!                         │  │ server │   │host+table│   │    random     │   │
//!                         │  └────────┘   └──────────┘   └───────┬───────┘   │
//!                         │                                      ▼           │
//!     Client Response     │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!     ◀───────────────────┼──│response│◀──│ forward  │◀──│    target     │◀──┼── Backend
//!                         │  └────────┘   └──────────┘   └───────────────┘   │
//!                         │                                                  │
//!                         │  config (+ watcher) · observability · lifecycle  │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use subdomain_proxy::config::{load_config, ConfigWatcher, ProxyConfig};
use subdomain_proxy::lifecycle::signals::spawn_signal_handler;
use subdomain_proxy::observability::{logging, metrics};
use subdomain_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "subdomain-proxy")]
#[command(about = "Name-based HTTP reverse proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload the routing table when the config file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("subdomain-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    match &cli.config {
        Some(path) => tracing::info!(
            path = %path.display(),
            bind_address = %config.listener.bind_address,
            domains = config.domains.len(),
            "Configuration loaded"
        ),
        None => tracing::warn!(
            bind_address = %config.listener.bind_address,
            "No --config given; running with an empty routing table"
        ),
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server_shutdown = shutdown.subscribe();
    HttpServer::new(config)
        .run(listener, config_updates, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
