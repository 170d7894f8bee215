//! licensor license server
//!
//! Serves the license verification endpoint used by licensed clients, and
//! the admin API used to issue and manage licenses.
//!
//! Usage:
//!   licensor-server --port 3000 --database licenses.db

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use licensor_server::auth::KdfParams;
use licensor_server::config::Config;
use licensor_server::{build_router, AppState};
use licensor_store::{MemoryStore, SqliteStore};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let default_level = if config.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("licensor server starting...");

    let state = if config.in_memory {
        warn!("running with an in-memory store; licenses will not be persisted");
        AppState::new(
            Arc::new(MemoryStore::new()),
            config.session_ttl(),
            KdfParams::default(),
        )
    } else {
        let store = SqliteStore::open(&config.database, config.store_timeout())
            .with_context(|| format!("Failed to open database {}", config.database.display()))?;
        info!("Using license database {}", config.database.display());
        AppState::new(Arc::new(store), config.session_ttl(), KdfParams::default())
    };

    if !config.require_auth {
        warn!("admin authentication disabled; management routes are open");
    }

    let app = build_router(state, &config.router_options());
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("\n========================================");
    println!("  licensor License API Running");
    println!("========================================");
    println!("  Listening: http://{}", addr);
    println!("  Auth:      {}", if config.require_auth { "required" } else { "disabled" });
    println!("========================================\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("licensor server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
