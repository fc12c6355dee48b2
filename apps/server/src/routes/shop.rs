//! Shop endpoints: the caller's one shop.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::AppState;
use dukan_core::validation::validate_shop_name;
use dukan_core::Shop;
use dukan_db::repository::shop::{NewShop, ShopUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateShopRequest {
    shop_name: String,
    shop_phone: Option<String>,
    shop_address: Option<String>,
    province: Option<String>,
    district: Option<String>,
    sub_district: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UpdateShopRequest {
    shop_name: Option<String>,
    shop_phone: Option<String>,
    shop_address: Option<String>,
    province: Option<String>,
    district: Option<String>,
    sub_district: Option<String>,
    postal_code: Option<String>,
}

/// `GET /api/shop` — the caller's shop, or 404.
async fn get_my_shop(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Shop>, ApiError> {
    let shop = super::require_shop(&state, &identity).await?;
    Ok(Json(shop))
}

/// `POST /api/shop` — create the caller's shop; 409 when one exists.
///
/// The UNIQUE constraint on the owning user backs the conflict under
/// races; the explicit pre-check just gives a cleaner message.
async fn create_shop(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateShopRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_shop_name(&req.shop_name)?;

    if state
        .db
        .shops()
        .get_by_user(&identity.user_id)
        .await
        .map_err(ApiError::from)?
        .is_some()
    {
        return Err(ApiError::conflict("A shop already exists for this account"));
    }

    let shop = state
        .db
        .shops()
        .create(
            &identity.user_id,
            NewShop {
                name: req.shop_name.trim().to_string(),
                phone: req.shop_phone,
                address: req.shop_address,
                province: req.province,
                district: req.district,
                sub_district: req.sub_district,
                postal_code: req.postal_code,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(shop)))
}

/// `PATCH /api/shop` — partial update; 404 when no shop exists.
async fn update_shop(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<UpdateShopRequest>,
) -> Result<Json<Shop>, ApiError> {
    if let Some(name) = &req.shop_name {
        validate_shop_name(name)?;
    }

    let updated = state
        .db
        .shops()
        .update_for_user(
            &identity.user_id,
            ShopUpdate {
                name: req.shop_name.map(|n| n.trim().to_string()),
                phone: req.shop_phone,
                address: req.shop_address,
                province: req.province,
                district: req.district,
                sub_district: req.sub_district,
                postal_code: req.postal_code,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("No shop exists for this account"))?;

    Ok(Json(updated))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_my_shop).post(create_shop).patch(update_shop))
}
