//! # Analytics Module
//!
//! Pure aggregation functions behind the dashboard and its insight panels.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dashboard Aggregation                               │
//! │                                                                         │
//! │  GET /api/dashboard/stats?date=2026-08-24                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TimeWindow::day_of(date)      TimeWindow::month_of(date)               │
//! │  [00:00:00.000 .. 23:59:59.999]  [1st 00:00 .. last day 23:59:59.999]  │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  day_totals(sales, window)      sales_total(sales, window)              │
//! │   ├── cash     = Σ paid   of cash sales                                 │
//! │   ├── transfer = Σ paid   of transfer sales                             │
//! │   ├── credit   = Σ debt   of credit sales                               │
//! │   ├── total    = Σ total  of ALL sales                                  │
//! │   └── transactions = count                                              │
//! │                                                                         │
//! │  Insight rankings (top 5 each):                                         │
//! │   low_stock_products · top_debtors · top_selling_products               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transfer sales get their own bucket. An earlier rendition of this
//! dashboard reported transfers as zero while still counting them in the
//! grand total, which made the buckets impossible to reconcile against
//! the cash drawer.
//!
//! Everything here is a pure function over slices. The repositories fetch
//! the rows; this module never touches I/O.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Customer, PaymentMethod, Product, Sale, SaleItem};
use crate::DEFAULT_TOP_N;

/// Placeholder name when a ranked product id cannot be resolved.
pub const UNKNOWN_PRODUCT_NAME: &str = "unknown";

// =============================================================================
// Time Windows
// =============================================================================

/// A closed interval of instants used for reporting queries.
///
/// Both endpoints are inclusive: a sale stamped exactly at the end instant
/// still belongs to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// The calendar day containing `date`: 00:00:00.000 through
    /// 23:59:59.999, in UTC.
    pub fn day_of(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::milliseconds(86_400_000 - 1);
        TimeWindow { start, end }
    }

    /// The calendar month containing `date`: first day 00:00:00.000
    /// through last day 23:59:59.999, in UTC.
    pub fn month_of(date: NaiveDate) -> Self {
        // Day 1 always exists; the unreachable fallbacks keep this total.
        let first = date.with_day(1).unwrap_or(date);
        let next_first = if first.month() == 12 {
            first
                .with_year(first.year() + 1)
                .and_then(|d| d.with_month(1))
        } else {
            first.with_month(first.month() + 1)
        }
        .unwrap_or(first);

        let start = first.and_time(NaiveTime::MIN).and_utc();
        let end = next_first.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1);
        TimeWindow { start, end }
    }

    /// Window start (inclusive).
    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end (inclusive).
    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether an instant falls inside the window.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

// =============================================================================
// Day Totals
// =============================================================================

/// Per-method sales totals for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    /// Cash received on cash sales.
    pub cash_cents: i64,
    /// Amounts received by bank/wallet transfer.
    pub transfer_cents: i64,
    /// New debt issued on credit sales.
    pub credit_cents: i64,
    /// Grand total across every payment method.
    pub total_cents: i64,
    /// Number of sales in the window.
    pub transactions: i64,
}

/// Sums one day's sales into per-method buckets.
///
/// Sales outside the window are ignored, so callers may pass a coarser
/// slice than the exact day. Sales with method `other` count toward the
/// grand total and the transaction count but have no dedicated bucket.
pub fn day_totals(sales: &[Sale], window: &TimeWindow) -> DayTotals {
    let mut totals = DayTotals::default();

    for sale in sales {
        if !window.contains(sale.sale_date) {
            continue;
        }

        match sale.payment_method {
            PaymentMethod::Cash => totals.cash_cents += sale.paid_cents,
            PaymentMethod::Transfer => totals.transfer_cents += sale.paid_cents,
            PaymentMethod::Credit => totals.credit_cents += sale.debt_cents,
            PaymentMethod::Other => {}
        }

        totals.total_cents += sale.total_cents;
        totals.transactions += 1;
    }

    totals
}

/// Sums `total_cents` over every sale inside the window.
///
/// Used with [`TimeWindow::month_of`] for the dashboard's monthly figure.
pub fn sales_total(sales: &[Sale], window: &TimeWindow) -> Money {
    sales
        .iter()
        .filter(|s| window.contains(s.sale_date))
        .map(Sale::total)
        .sum()
}

// =============================================================================
// Insight Rankings
// =============================================================================
// All rankings use stable sorts, so equal keys keep their encounter order.
// That makes repeated calls over the same rows return the same list, which
// the dashboard relies on to avoid reshuffling between refreshes.

/// Active products at or below their minimum stock, most depleted first,
/// capped at `top_n`.
pub fn low_stock_products(products: &[Product], top_n: usize) -> Vec<&Product> {
    let mut low: Vec<&Product> = products
        .iter()
        .filter(|p| p.is_active && p.stock_level().needs_restock())
        .collect();

    low.sort_by_key(|p| p.current_stock);
    low.truncate(top_n);
    low
}

/// Customers with outstanding debt, largest first, capped at `top_n`.
pub fn top_debtors(customers: &[Customer], top_n: usize) -> Vec<&Customer> {
    let mut debtors: Vec<&Customer> = customers.iter().filter(|c| c.has_debt()).collect();

    debtors.sort_by(|a, b| b.total_debt_cents.cmp(&a.total_debt_cents));
    debtors.truncate(top_n);
    debtors
}

/// One product's ranked sales volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesRank {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
}

/// Best-selling products by unit quantity over the sales inside `window`,
/// capped at `top_n`.
///
/// Quantities are summed per product across the items of every matching
/// sale. Names are resolved from `products`; an item whose product is
/// missing from the slice ranks under [`UNKNOWN_PRODUCT_NAME`] rather
/// than being dropped, so the quantities still add up.
pub fn top_selling_products(
    sales: &[Sale],
    items: &[SaleItem],
    products: &[Product],
    window: &TimeWindow,
    top_n: usize,
) -> Vec<ProductSalesRank> {
    let sale_ids: std::collections::HashSet<&str> = sales
        .iter()
        .filter(|s| window.contains(s.sale_date))
        .map(|s| s.id.as_str())
        .collect();

    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    // Accumulate in encounter order; the index map keeps lookups O(1)
    // while the Vec preserves deterministic tie order.
    let mut ranks: Vec<ProductSalesRank> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        if !sale_ids.contains(item.sale_id.as_str()) {
            continue;
        }

        match index.get(item.product_id.as_str()) {
            Some(&i) => ranks[i].quantity_sold += item.quantity,
            None => {
                index.insert(item.product_id.as_str(), ranks.len());
                ranks.push(ProductSalesRank {
                    product_id: item.product_id.clone(),
                    product_name: names
                        .get(item.product_id.as_str())
                        .copied()
                        .unwrap_or(UNKNOWN_PRODUCT_NAME)
                        .to_string(),
                    quantity_sold: item.quantity,
                });
            }
        }
    }

    ranks.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    ranks.truncate(top_n);
    ranks
}

// =============================================================================
// Unit Tests
// =============================================================================
