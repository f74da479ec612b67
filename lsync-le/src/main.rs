//! lsync-le - Lyric Editor microservice
//!
//! Serves the lyric time-sync workflow over HTTP + SSE. Default bind address
//! is 127.0.0.1:5726.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lsync_common::config::{load_toml_config, ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lsync_le::AppState;

/// Command-line arguments for lsync-le
#[derive(Parser, Debug)]
#[command(name = "lsync-le")]
#[command(about = "Lyric time-sync editor for lsync")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/lsync/config.toml)
    #[arg(short, long, env = "LSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite catalog database
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Shared passcode for the sync gate
    #[arg(long)]
    passcode: Option<String>,

    /// Bearer token granting admin privileges
    #[arg(long)]
    admin_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lsync_le=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting lsync-le (Lyric Editor) v{}", env!("CARGO_PKG_VERSION"));

    let file_config = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = ServiceConfig::resolve(
        ConfigOverrides {
            bind_addr: args.bind,
            db_path: args.database,
            sync_passcode: args.passcode,
            admin_token: args.admin_token,
        },
        file_config,
    );

    info!("Database: {}", config.db_path.display());
    if config.admin_token.is_none() {
        info!("No admin token configured; saving synced lyrics is disabled");
    }

    let db = lsync_common::db::init_database(&config.db_path)
        .await
        .context("Failed to open catalog database")?;

    let state = AppState::new(db, &config);
    let app = lsync_le::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
