//! Dashboard endpoints: today's totals, the monthly figure, and the
//! insight rankings.
//!
//! Both endpoints degrade instead of failing when the store is
//! unreachable: stats return all zeros, insights return empty lists,
//! each with a 200. The dashboard is the first page the shopkeeper sees;
//! it renders partial rather than crashing.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::AppState;
use dukan_core::analytics::{
    day_totals, low_stock_products, sales_total, top_debtors, top_selling_products, DayTotals,
    ProductSalesRank, TimeWindow,
};
use dukan_core::{Customer, Product, StockLevel, DEFAULT_TOP_N};

#[derive(Debug, Deserialize)]
struct DateQuery {
    /// `YYYY-MM-DD`; defaults to today's UTC calendar date.
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStats {
    date: NaiveDate,
    today: DayTotals,
    monthly_sales_cents: i64,
}

/// A low-stock product with its severity classification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LowStockEntry {
    product: Product,
    level: StockLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Insights {
    low_stock: Vec<LowStockEntry>,
    top_debtors: Vec<Customer>,
    top_selling: Vec<ProductSalesRank>,
}

/// `GET /api/dashboard/stats?date=YYYY-MM-DD`
async fn stats(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<DateQuery>,
) -> Result<Json<DashboardStats>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let day = TimeWindow::day_of(date);
    let month = TimeWindow::month_of(date);

    let result = async {
        let shop = super::require_shop(&state, &identity).await?;
        // One fetch covers both windows: the day is inside the month
        state
            .db
            .sales()
            .list_in_window(&shop.id, month.start(), month.end())
            .await
            .map_err(ApiError::from)
    }
    .await;

    match result {
        Ok(sales) => Ok(Json(DashboardStats {
            date,
            today: day_totals(&sales, &day),
            monthly_sales_cents: sales_total(&sales, &month).cents(),
        })),
        Err(err) if err.is_unavailable() => {
            warn!("Dashboard stats degraded to zeros: store unavailable");
            Ok(Json(DashboardStats {
                date,
                today: DayTotals::default(),
                monthly_sales_cents: 0,
            }))
        }
        Err(err) => Err(err),
    }
}

/// `GET /api/dashboard/insights` — low stock, top debtors, and this
/// month's best sellers, top five each.
async fn insights(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Insights>, ApiError> {
    let month = TimeWindow::month_of(Utc::now().date_naive());

    let result = async {
        let shop = super::require_shop(&state, &identity).await?;

        let products = state.db.products().list_for_shop(&shop.id).await?;
        let customers = state.db.customers().list_for_shop(&shop.id).await?;
        let sales = state
            .db
            .sales()
            .list_in_window(&shop.id, month.start(), month.end())
            .await?;
        let items = state
            .db
            .sales()
            .items_in_window(&shop.id, month.start(), month.end())
            .await?;

        let low_stock = low_stock_products(&products, DEFAULT_TOP_N)
            .into_iter()
            .map(|p| LowStockEntry {
                level: p.stock_level(),
                product: p.clone(),
            })
            .collect();
        let debtors = top_debtors(&customers, DEFAULT_TOP_N)
            .into_iter()
            .cloned()
            .collect();
        let top_selling = top_selling_products(&sales, &items, &products, &month, DEFAULT_TOP_N);

        Ok::<_, ApiError>(Insights {
            low_stock,
            top_debtors: debtors,
            top_selling,
        })
    }
    .await;

    match result {
        Ok(insights) => Ok(Json(insights)),
        Err(err) if err.is_unavailable() => {
            warn!("Dashboard insights degraded to empty: store unavailable");
            Ok(Json(Insights {
                low_stock: Vec::new(),
                top_debtors: Vec::new(),
                top_selling: Vec::new(),
            }))
        }
        Err(err) => Err(err),
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(stats))
        .route("/insights", get(insights))
}
