//! # dukan-server: HTTP JSON API for Dukan
//!
//! The typed RPC surface the web client consumes. Thin by design: every
//! handler authorizes the caller, resolves their shop, validates the
//! input shape, and delegates to `dukan-db` repositories or `dukan-core`
//! aggregation functions.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Flow                                    │
//! │                                                                         │
//! │  POST /api/sales  (Authorization: Bearer <jwt>)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Identity extractor ── invalid token ──► 401                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_shop() ── no shop for caller ──► 404                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sale_draft() ── invariant broken ──► 400                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.sales().create_sale()  (one transaction)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 { sale + items }                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use dukan_db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Builds the full application router.
///
/// Everything under `/api` requires a bearer identity; `/health` does not.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", routes::auth::routes())
        .nest("/shop", routes::shop::routes())
        .nest("/products", routes::product::routes())
        .nest("/customers", routes::customer::routes())
        .nest("/sales", routes::sales::routes())
        .nest("/dashboard", routes::dashboard::routes())
        .nest("/daily-close", routes::daily_close::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe. Reports whether the store answers a trivial query.
async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let db_ok = state.db.health_check().await;
    Json(json!({ "status": if db_ok { "ok" } else { "degraded" }, "database": db_ok }))
}
