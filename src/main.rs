//! Intercepting reverse proxy binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │              INTERCEPTING PROXY              │
//!  Client Request   │  ┌────────┐   ┌────────────┐   ┌──────────┐  │
//!  ─────────────────┼─▶│  http  │──▶│ middleware │──▶│ upstream │──┼──▶ Backend
//!                   │  │ server │   │    gate    │   │  client  │  │
//!                   │  └────────┘   └─────┬──────┘   └──────────┘  │
//!                   │                     ▼                        │
//!                   │              ┌─────────────┐                 │
//!  Client Response  │              │ interceptor │  filtered?      │
//!  ◀────────────────┼──────────────│ + assembler │──▶ error page   │
//!                   │              └─────────────┘                 │
//!                   └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error_intercept::config::{load_config, ProxyConfig};
use error_intercept::HttpServer;

#[derive(Parser)]
#[command(name = "error-intercept")]
#[command(about = "Reverse proxy that replaces filtered error responses with styled pages")]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "error_intercept=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => load_config(&path)?,
        None => ProxyConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        filtered_ranges = config.intercept.status.len(),
        rewrites = config.intercept.rewrites.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
