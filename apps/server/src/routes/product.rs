//! Product endpoints, including the price-change operation and its
//! append-only history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::AppState;
use dukan_core::validation::{validate_price_cents, validate_product_name, validate_stock_count};
use dukan_core::{PriceChange, Product};
use dukan_db::repository::product::{NewProduct, ProductUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductRequest {
    name: String,
    code: Option<String>,
    category: Option<String>,
    unit: Option<String>,
    #[serde(default)]
    cost_price_cents: i64,
    #[serde(default)]
    selling_price_cents: i64,
    #[serde(default)]
    current_stock: i64,
    #[serde(default)]
    minimum_stock: i64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UpdateProductRequest {
    name: Option<String>,
    code: Option<String>,
    category: Option<String>,
    unit: Option<String>,
    cost_price_cents: Option<i64>,
    current_stock: Option<i64>,
    minimum_stock: Option<i64>,
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceChangeRequest {
    old_price_cents: i64,
    new_price_cents: i64,
    notes: Option<String>,
}

/// Fetches a product and checks it belongs to the caller's shop.
///
/// Reads are ownership-checked too: a foreign id is 403, never a leak.
async fn owned_product(
    state: &AppState,
    identity: &Identity,
    product_id: &str,
) -> Result<Product, ApiError> {
    let shop = super::require_shop(state, identity).await?;

    let product = state
        .db
        .products()
        .get_by_id(product_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {product_id}")))?;

    if product.shop_id != shop.id {
        return Err(ApiError::forbidden(
            "Product belongs to a different shop",
        ));
    }

    Ok(product)
}

/// `GET /api/products` — the shop's products; degrades to an empty list
/// when the store is unreachable.
async fn list_products(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Product>>, ApiError> {
    let result = async {
        let shop = super::require_shop(&state, &identity).await?;
        state
            .db
            .products()
            .list_for_shop(&shop.id)
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(products) => Ok(Json(products)),
        Err(err) if err.is_unavailable() => {
            warn!("Product list degraded to empty: store unavailable");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err),
    }
}

/// `GET /api/products/:id`
async fn get_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = owned_product(&state, &identity, &product_id).await?;
    Ok(Json(product))
}

/// `POST /api/products`
async fn create_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_product_name(&req.name)?;
    validate_price_cents("costPriceCents", req.cost_price_cents)?;
    validate_price_cents("sellingPriceCents", req.selling_price_cents)?;
    validate_stock_count("currentStock", req.current_stock)?;
    validate_stock_count("minimumStock", req.minimum_stock)?;

    let shop = super::require_shop(&state, &identity).await?;
    let product = state
        .db
        .products()
        .create(
            &shop.id,
            NewProduct {
                name: req.name.trim().to_string(),
                code: req.code,
                category: req.category,
                unit: req.unit,
                cost_price_cents: req.cost_price_cents,
                selling_price_cents: req.selling_price_cents,
                current_stock: req.current_stock,
                minimum_stock: req.minimum_stock,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /api/products/:id`
async fn update_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    if let Some(name) = &req.name {
        validate_product_name(name)?;
    }
    if let Some(cost) = req.cost_price_cents {
        validate_price_cents("costPriceCents", cost)?;
    }
    if let Some(stock) = req.current_stock {
        validate_stock_count("currentStock", stock)?;
    }
    if let Some(minimum) = req.minimum_stock {
        validate_stock_count("minimumStock", minimum)?;
    }

    owned_product(&state, &identity, &product_id).await?;

    let updated = state
        .db
        .products()
        .update(
            &product_id,
            ProductUpdate {
                name: req.name.map(|n| n.trim().to_string()),
                code: req.code,
                category: req.category,
                unit: req.unit,
                cost_price_cents: req.cost_price_cents,
                current_stock: req.current_stock,
                minimum_stock: req.minimum_stock,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// `GET /api/products/:id/price-history` — most recent first, capped;
/// degrades to an empty list when the store is unreachable.
async fn price_history(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<PriceChange>>, ApiError> {
    let result = async {
        owned_product(&state, &identity, &product_id).await?;
        state
            .db
            .products()
            .price_history(&product_id)
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(history) => Ok(Json(history)),
        Err(err) if err.is_unavailable() => {
            warn!("Price history degraded to empty: store unavailable");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err),
    }
}

/// `POST /api/products/:id/price-history` — the atomic price change:
/// verifies the supplied old price is still current, updates the selling
/// price, and appends the history row in one transaction.
async fn change_price(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(product_id): Path<String>,
    Json(req): Json<PriceChangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_price_cents("oldPriceCents", req.old_price_cents)?;
    validate_price_cents("newPriceCents", req.new_price_cents)?;

    owned_product(&state, &identity, &product_id).await?;

    let change = state
        .db
        .products()
        .change_price(
            &product_id,
            req.old_price_cents,
            req.new_price_cents,
            &identity.user_id,
            req.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(change)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).patch(update_product))
        .route("/:id/price-history", get(price_history).post(change_price))
}
