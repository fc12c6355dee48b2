//! Customer endpoints, including the debt-payment ledger.

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
use dukan_core::validation::{validate_customer_name, validate_payment_amount};
use dukan_core::{Customer, DebtPayment, SettlementMethod};
use dukan_db::repository::customer::{CustomerUpdate, NewCustomer};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerRequest {
    name: String,
    phone: Option<String>,
    address: Option<String>,
    province: Option<String>,
    district: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UpdateCustomerRequest {
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    province: Option<String>,
    district: Option<String>,
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDebtPaymentRequest {
    paid_cents: i64,
    #[serde(default)]
    method: SettlementMethod,
    sale_id: Option<String>,
    notes: Option<String>,
}

/// Fetches a customer and checks it belongs to the caller's shop.
async fn owned_customer(
    state: &AppState,
    identity: &Identity,
    customer_id: &str,
) -> Result<Customer, ApiError> {
    let shop = super::require_shop(state, identity).await?;

    let customer = state
        .db
        .customers()
        .get_by_id(customer_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Customer not found: {customer_id}")))?;

    if customer.shop_id != shop.id {
        return Err(ApiError::forbidden(
            "Customer belongs to a different shop",
        ));
    }

    Ok(customer)
}

/// `GET /api/customers` — the shop's customers; degrades to an empty
/// list when the store is unreachable.
async fn list_customers(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let result = async {
        let shop = super::require_shop(&state, &identity).await?;
        state
            .db
            .customers()
            .list_for_shop(&shop.id)
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(customers) => Ok(Json(customers)),
        Err(err) if err.is_unavailable() => {
            warn!("Customer list degraded to empty: store unavailable");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err),
    }
}

/// `GET /api/customers/:id`
async fn get_customer(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(customer_id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let customer = owned_customer(&state, &identity, &customer_id).await?;
    Ok(Json(customer))
}

/// `POST /api/customers`
async fn create_customer(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_customer_name(&req.name)?;

    let shop = super::require_shop(&state, &identity).await?;
    let customer = state
        .db
        .customers()
        .create(
            &shop.id,
            NewCustomer {
                name: req.name.trim().to_string(),
                phone: req.phone,
                address: req.address,
                province: req.province,
                district: req.district,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// `PATCH /api/customers/:id`
async fn update_customer(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(customer_id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    if let Some(name) = &req.name {
        validate_customer_name(name)?;
    }

    owned_customer(&state, &identity, &customer_id).await?;

    let updated = state
        .db
        .customers()
        .update(
            &customer_id,
            CustomerUpdate {
                name: req.name.map(|n| n.trim().to_string()),
                phone: req.phone,
                address: req.address,
                province: req.province,
                district: req.district,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// `GET /api/customers/:id/debt-payments` — most recent first, capped;
/// degrades to an empty list when the store is unreachable.
async fn list_debt_payments(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<DebtPayment>>, ApiError> {
    let result = async {
        owned_customer(&state, &identity, &customer_id).await?;
        state
            .db
            .customers()
            .debt_payments(&customer_id)
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(payments) => Ok(Json(payments)),
        Err(err) if err.is_unavailable() => {
            warn!("Debt payment list degraded to empty: store unavailable");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err),
    }
}

/// `POST /api/customers/:id/debt-payments` — settles part of the
/// customer's debt; the ledger totals and the payment row move in one
/// transaction, and overpaying is rejected.
async fn create_debt_payment(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(customer_id): Path<String>,
    Json(req): Json<CreateDebtPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payment_amount(req.paid_cents)?;

    let customer = owned_customer(&state, &identity, &customer_id).await?;

    // A referenced originating sale must belong to the same shop
    if let Some(sale_id) = &req.sale_id {
        let sale = state
            .db
            .sales()
            .get_by_id(sale_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found(format!("Sale not found: {sale_id}")))?;
        if sale.shop_id != customer.shop_id {
            return Err(ApiError::forbidden("Sale belongs to a different shop"));
        }
    }

    let payment = state
        .db
        .customers()
        .record_debt_payment(
            &customer_id,
            req.paid_cents,
            req.method,
            req.sale_id,
            req.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).patch(update_customer))
        .route(
            "/:id/debt-payments",
            get(list_debt_payments).post(create_debt_payment),
        )
}
