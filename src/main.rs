//! OGC web service relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                    RELAY                     │
//!   Client Request        │  ┌────────┐    ┌───────────┐    ┌─────────┐  │
//!   ──────────────────────┼─▶│  http  │───▶│ validator │───▶│executor │──┼──▶ Upstream
//!   /proxy?u=...          │  │ server │    │allow-list │    │ reqwest │  │    (WMS/WFS)
//!   /feature-info?...     │  └────────┘    └─────┬─────┘    └────┬────┘  │
//!                         │       ▲          reject│               │       │
//!   Client Response       │       │ 4xx ◀────────┘               │       │
//!   ◀─────────────────────┼───────┴──────── text/xml body ◀──────┘       │
//!                         │                                              │
//!                         │  config · observability · admin · lifecycle  │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ows_relay::config::{load, ALLOWED_HOSTS_ENV};
use ows_relay::observability::{logging, metrics};
use ows_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "ows-relay")]
#[command(about = "Allow-listed HTTP relay for OGC web services", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load(cli.config.as_deref(), cli.bind)?;
    let config = loaded.config;

    logging::init_logging(&config.observability);
    tracing::info!("ows-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if loaded.hosts_overridden {
        tracing::info!(hosts = ?config.allow_list.hosts, "Allow-list overridden from {}", ALLOWED_HOSTS_ENV);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_hosts = ?config.allow_list.hosts,
        host_extraction = ?config.allow_list.host_extraction,
        upstream_timeout_secs = config.upstream.timeout_secs,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
