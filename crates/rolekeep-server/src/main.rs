//! rolekeep server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rolekeep_db::{connect, run_migrations};
use rolekeep_server::ServerConfig;
use rolekeep_server::http::{AppState, create_router_with_limits};
use rolekeep_server::logging::init_logging;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rolekeep", version, about = "Users, organizations and permissions over REST")]
struct Args {
    /// Path to a YAML configuration file. Environment variables still apply.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::from_env()?,
    };

    init_logging(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting rolekeep server");

    let db = connect(&config.database)
        .await
        .context("failed to connect to SurrealDB")?;

    run_migrations(&db)
        .await
        .context("failed to apply schema migrations")?;

    let state = AppState::with_allowed_roles(db, config.permissions.allowed_roles.clone());
    let router = create_router_with_limits(
        state,
        config.server.body_limit_bytes,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host / server.port")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("rolekeep server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
