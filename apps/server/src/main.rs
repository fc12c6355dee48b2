//! # Dukan Server
//!
//! HTTP JSON API for the Dukan shop-management backend.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Server Startup                                 │
//! │                                                                         │
//! │  tracing init ──► config load ──► SQLite pool + migrations             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build_router(state) ──► axum::serve ──► graceful shutdown on signal   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dukan_db::{Database, DbConfig};
use dukan_server::config::ServerConfig;
use dukan_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Dukan server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        db = %config.database_path,
        deduct_stock = config.deduct_stock_on_sale,
        "Configuration loaded"
    );

    // Connect to SQLite and run migrations
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Build the application
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });
    let app = build_router(state);

    // Start serving
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
