//! Storefront SSR host.
//!
//! Renders storefront pages on the server against the backend content API,
//! relays API traffic to the backend, and serves the content administration
//! shell document.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser Request
//!     ──────────────▶ http::server ──▶ routing::RouteTable ──match──▶ handlers
//!                          │                    │                    (health, robots,
//!                          │                    │ no match            templates, relay,
//!                          │                    ▼                     redirects)
//!                          │               http::page
//!                          │        bootstrap ─ session bridge
//!                          │                    │
//!                          │          render::ConvergenceEngine ◀──▶ backend (ContentApi)
//!                          │                    │
//!                          │            document::assemble
//!                          ▼                    │
//!     ◀──────────────── response (HTML / redirect / relayed reply)
//!
//!     Cross-cutting: config (TOML + hot reload), observability (tracing, metrics),
//!                    lifecycle (signals, graceful shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use storefront_ssr::config::{load_config, watcher::ConfigWatcher, SsrConfig};
use storefront_ssr::http::{AppRuntime, HttpServer};
use storefront_ssr::lifecycle::{spawn_signal_listener, Shutdown};
use storefront_ssr::observability::{init_logging, init_metrics};

#[derive(Parser)]
#[command(name = "storefront-ssr")]
#[command(about = "Server-side rendering host for the storefront", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SsrConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront-ssr starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.environment,
        backend = %config.backend.base_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let mut server = HttpServer::new(AppRuntime::from_config(config)?);

    // The watcher stops when dropped, so it lives until main returns.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            server = server.with_config_updates(updates);
            Some(watcher.run()?)
        }
        None => None,
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
