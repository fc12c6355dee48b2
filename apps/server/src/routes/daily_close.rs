//! Daily close endpoints: end-of-day cash reconciliation.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::AppState;
use dukan_core::analytics::TimeWindow;
use dukan_core::validation::{validate_price_cents, validate_stock_count};
use dukan_core::DailyClose;
use dukan_db::repository::daily_close::NewDailyClose;

#[derive(Debug, Deserialize)]
struct DateQuery {
    /// `YYYY-MM-DD`; defaults to today's UTC calendar date.
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDailyCloseRequest {
    total_sales_cents: i64,
    total_cash_cents: i64,
    total_credit_cents: i64,
    transaction_count: i64,
    notes: Option<String>,
}

/// `GET /api/daily-close?date=YYYY-MM-DD` — the close whose timestamp
/// falls inside that calendar day, or 404.
async fn get_close(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyClose>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let window = TimeWindow::day_of(date);

    let shop = super::require_shop(&state, &identity).await?;
    let close = state
        .db
        .daily_closes()
        .get_in_window(&shop.id, window.start(), window.end())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("No daily close recorded for {date}")))?;

    Ok(Json(close))
}

/// `GET /api/daily-close/history` — most recent first, capped; degrades
/// to an empty list when the store is unreachable.
async fn history(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<DailyClose>>, ApiError> {
    let result = async {
        let shop = super::require_shop(&state, &identity).await?;
        state
            .db
            .daily_closes()
            .history(&shop.id)
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(closes) => Ok(Json(closes)),
        Err(err) if err.is_unavailable() => {
            warn!("Daily close history degraded to empty: store unavailable");
            Ok(Json(Vec::new()))
        }
        Err(err) => Err(err),
    }
}

/// `POST /api/daily-close` — records today's close, stamped with the
/// acting user; 409 when the shop already closed this calendar day.
async fn create_close(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateDailyCloseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_price_cents("totalSalesCents", req.total_sales_cents)?;
    validate_price_cents("totalCashCents", req.total_cash_cents)?;
    validate_price_cents("totalCreditCents", req.total_credit_cents)?;
    // Counts share the non-negative rule with stock figures
    validate_stock_count("transactionCount", req.transaction_count)?;

    let shop = super::require_shop(&state, &identity).await?;
    let close = state
        .db
        .daily_closes()
        .create(
            &shop.id,
            &identity.user_id,
            NewDailyClose {
                total_sales_cents: req.total_sales_cents,
                total_cash_cents: req.total_cash_cents,
                total_credit_cents: req.total_credit_cents,
                transaction_count: req.transaction_count,
                notes: req.notes,
            },
        )
        .await
        .map_err(|err| match err {
            dukan_db::DbError::UniqueViolation { .. } => {
                ApiError::conflict("A daily close already exists for today")
            }
            other => ApiError::from(other),
        })?;

    Ok((StatusCode::CREATED, Json(close)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_close).post(create_close))
        .route("/history", get(history))
}
