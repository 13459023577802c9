//! dirproxy: a reverse proxy that maps public directories onto backends.
//!
//! ```text
//!   Client ──▶ /backend/x ──▶ ┌──────────────┐ ──▶ /x ──▶ Backend
//!                             │ routing table│
//!   Client ◀── Location: ◀─── │ process/     │ ◀── Location: /login
//!              /backend/login │ revert       │
//!                             └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dirproxy::config::{load_config, ConfigWatcher, ProxyConfig};
use dirproxy::lifecycle::signals::shutdown_on_signal;
use dirproxy::observability::{logging, metrics};
use dirproxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "dirproxy")]
#[command(about = "Reverse proxy with directory-prefix routing", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload routes when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dirproxy starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher handle alive for the lifetime of the server
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_on_signal(&signal_shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
