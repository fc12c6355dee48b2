//! Identity endpoints.
//!
//! Token issuing belongs to the external identity provider; these routes
//! only surface the identity the bearer token already carries.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::auth::Identity;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user_id: String,
    name: Option<String>,
    email: Option<String>,
}

/// `GET /api/auth/me` — the caller identity from the bearer token.
async fn me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.user_id,
        name: identity.name,
        email: identity.email,
    })
}

/// `POST /api/auth/logout` — bearer tokens are stateless; the client
/// discards its copy. This endpoint exists so the client has one call to
/// make regardless of how sessions are held upstream.
async fn logout(_identity: Identity) -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}
