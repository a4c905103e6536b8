//! viabus API server.
//!
//! Loads a transit network snapshot into memory and serves the journey
//! planning API over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tower::limit::ConcurrencyLimitLayer;
use tracing_subscriber::EnvFilter;
use viabus_core::loading::load_network;

mod config;
mod dto;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "viabus-server", about = "Transit journey planning API server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "viabus.toml")]
    config: PathBuf,
    /// Listen address, overrides the config file.
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Network snapshot path, overrides the config file.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(snapshot) = args.snapshot {
        config.snapshot = Some(snapshot);
    }

    let Some(snapshot) = config.snapshot.clone() else {
        return Err("no network snapshot configured; pass --snapshot or set `snapshot` in the config file".into());
    };

    tracing::info!("loading network snapshot from {}", snapshot.display());
    let network = load_network(&snapshot)?;
    tracing::info!(
        stops = network.stop_count(),
        routes = network.route_count(),
        ways = network.way_count(),
        "network loaded"
    );

    let state = AppState::new(network, config.planning(), config.auth_token.clone());
    let app = routes::create_router(state)
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {err}");
        return;
    }
    tracing::info!("shutdown signal received");
}
