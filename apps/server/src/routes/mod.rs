//! # Route Modules
//!
//! One module per resource, each exporting a `routes()` builder nested
//! under `/api` by [`crate::build_router`]. DTOs live beside the handlers
//! that accept them; entity responses are the camelCase-serialized
//! `dukan-core` types themselves.

pub mod auth;
pub mod customer;
pub mod daily_close;
pub mod dashboard;
pub mod product;
pub mod sales;
pub mod shop;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::AppState;
use dukan_core::Shop;

/// Resolves the caller's shop or fails with NOT_FOUND.
///
/// Every shop-scoped endpoint starts here; all subsequent queries are
/// scoped to the returned shop's id.
pub(crate) async fn require_shop(state: &AppState, identity: &Identity) -> Result<Shop, ApiError> {
    state
        .db
        .shops()
        .get_by_user(&identity.user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("No shop exists for this account"))
}
