//! notes-gateway
//!
//! Same-origin proxy in front of the notes backend.
//!
//! ```text
//!     Browser / notes-cli          ┌──────────────────────────────────────┐
//!     ────────────────────────────▶│ /api/{*path}                         │
//!                                  │   request id → trace → body limit    │
//!                                  │   → path join, header filter,        │
//!                                  │     body by content type             │──────▶ BACKEND_URL/api/{path}/
//!     ◀────────────────────────────│   ← status, headers, body verbatim   │◀──────
//!                                  └──────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use notes_gateway::config::{load_config, watcher::ConfigWatcher};
use notes_gateway::lifecycle::{signals, Shutdown};
use notes_gateway::observability::{logging, metrics};
use notes_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "notes-gateway")]
#[command(about = "Same-origin API gateway for the notes backend", long_about = None)]
struct Args {
    /// Optional TOML config file. BACKEND_URL and GATEWAY_BIND override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("notes-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_url = %config.upstream.backend_url,
        request_timeout_secs = ?config.timeouts.request_secs,
        max_body_bytes = ?config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match (&args.config, config.reload.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    (None, updates)
                }
            }
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
