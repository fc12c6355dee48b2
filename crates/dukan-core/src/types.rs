//! # Domain Types
//!
//! Core domain types used throughout Dukan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Shop       │   │    Product      │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  user_id (own)  │   │  shop_id (FK)   │   │  shop_id (FK)   │       │
//! │  │  name, address  │   │  prices, stock  │   │  debt ledger    │       │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │           │                     │                     │                 │
//! │  ┌────────▼────────┐   ┌────────▼────────┐   ┌────────▼────────┐       │
//! │  │      Sale       │   │  PriceChange    │   │  DebtPayment    │       │
//! │  │  + SaleItem[]   │   │  (append-only)  │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   DailyClose    │   │  PaymentMethod  │                             │
//! │  │  (one per day)  │   │  cash | credit  │                             │
//! │  └─────────────────┘   │ transfer | other│                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Pattern
//! Every entity except Shop hangs off a shop (directly or via its parent).
//! `Shop.user_id` ties the whole tree to one authenticated user; the API
//! layer resolves the caller's shop before touching anything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was tendered.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment, settled in full at the counter.
    Cash,
    /// Sold on credit; the unpaid portion lands in the customer's debt.
    Credit,
    /// Bank or mobile-wallet transfer.
    Transfer,
    /// Anything else (cheque, barter, staff account).
    Other,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Settlement Method
// =============================================================================

/// How a debt payment was settled.
///
/// Distinct from [`PaymentMethod`]: debt settlements allow cheques but a
/// settlement can never itself be "credit".
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SettlementMethod {
    Cash,
    Transfer,
    Check,
    Other,
}

impl Default for SettlementMethod {
    fn default() -> Self {
        SettlementMethod::Cash
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Stock classification relative to a product's minimum threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Comfortably above the minimum.
    Healthy,
    /// At or below the minimum threshold.
    Low,
    /// At or below half the minimum threshold.
    Critical,
}

impl StockLevel {
    /// Classifies a stock count against a minimum threshold.
    ///
    /// Boundary semantics: `current == minimum` is Low; `minimum + 1` is
    /// Healthy. Critical means twice the current stock still does not
    /// reach the minimum (integer math, no rounding surprises).
    ///
    /// ## Example
    /// ```rust
    /// use dukan_core::types::StockLevel;
    ///
    /// assert_eq!(StockLevel::for_stock(10, 10), StockLevel::Low);
    /// assert_eq!(StockLevel::for_stock(11, 10), StockLevel::Healthy);
    /// assert_eq!(StockLevel::for_stock(5, 10), StockLevel::Critical);
    /// ```
    pub const fn for_stock(current: i64, minimum: i64) -> Self {
        if current * 2 <= minimum {
            StockLevel::Critical
        } else if current <= minimum {
            StockLevel::Low
        } else {
            StockLevel::Healthy
        }
    }

    /// True for Low or Critical.
    pub const fn needs_restock(&self) -> bool {
        !matches!(self, StockLevel::Healthy)
    }
}

// =============================================================================
// Shop
// =============================================================================

/// A shop owned by exactly one user.
///
/// One user owns at most one shop; a second create attempt is a conflict.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user (subject claim of the bearer token).
    pub user_id: String,

    /// Display name shown on receipts and the dashboard.
    pub name: String,

    /// Contact phone number.
    pub phone: Option<String>,

    /// Street address.
    pub address: Option<String>,

    pub province: Option<String>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub postal_code: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shop this product belongs to.
    pub shop_id: String,

    /// Display name shown to the shopkeeper and on receipts.
    pub name: String,

    /// Optional business code (shopkeeper's own numbering, barcode, etc.).
    pub code: Option<String>,

    /// Optional category label for grouping.
    pub category: Option<String>,

    /// Optional unit label ("kg", "piece", "dozen").
    pub unit: Option<String>,

    /// Purchase cost in cents (for margin reporting).
    pub cost_price_cents: i64,

    /// Selling price in cents. Changed only through the price-change
    /// operation so history stays complete.
    pub selling_price_cents: i64,

    /// Current stock level.
    pub current_stock: i64,

    /// Restock threshold; at or below this the product counts as low stock.
    pub minimum_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Classifies this product's stock against its minimum threshold.
    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::for_stock(self.current_stock, self.minimum_stock)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of a shop, carrying a running debt ledger.
///
/// `total_debt_cents` is the outstanding balance; `total_paid_cents` the
/// lifetime settled amount. Both move only inside the same database
/// transaction as the sale or debt payment that changes them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    /// Outstanding debt in cents.
    pub total_debt_cents: i64,
    /// Lifetime amount settled in cents.
    pub total_paid_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the outstanding debt as Money.
    #[inline]
    pub fn outstanding_debt(&self) -> Money {
        Money::from_cents(self.total_debt_cents)
    }

    /// True when the customer owes the shop anything.
    #[inline]
    pub fn has_debt(&self) -> bool {
        self.total_debt_cents > 0
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale transaction.
///
/// Invariant: `total_cents == paid_cents + debt_cents`, and `total_cents`
/// equals the sum of the line totals. Both are enforced before insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub shop_id: String,
    /// Customer the sale is attributed to, when known.
    pub customer_id: Option<String>,
    /// Business timestamp of the sale (drives day/month reporting windows).
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub debt_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Client-supplied idempotency token, unique per shop when present.
    /// A resubmitted request with the same token returns the original sale.
    pub client_ref: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the paid portion as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Returns the debt portion as Money.
    #[inline]
    pub fn debt(&self) -> Money {
        Money::from_cents(self.debt_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// The unit price is frozen at time of sale; later price changes never
/// rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total (unit_price × quantity), validated before insert.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Price Change
// =============================================================================

/// An append-only record of a selling-price change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub id: String,
    pub product_id: String,
    pub old_price_cents: i64,
    pub new_price_cents: i64,
    /// User who made the change.
    pub changed_by: String,
    #[ts(as = "String")]
    pub change_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Daily Close
// =============================================================================

/// End-of-day cash reconciliation record. At most one per shop per
/// calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyClose {
    pub id: String,
    pub shop_id: String,
    #[ts(as = "String")]
    pub close_date: DateTime<Utc>,
    pub total_sales_cents: i64,
    pub total_cash_cents: i64,
    pub total_credit_cents: i64,
    pub transaction_count: i64,
    pub notes: Option<String>,
    /// User who performed the close.
    pub closed_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Debt Payment
// =============================================================================

/// An append-only record of a customer settling debt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    pub id: String,
    pub customer_id: String,
    /// Sale that originated the debt, when the payment targets one.
    pub sale_id: Option<String>,
    /// Amount settled by this payment, in cents.
    pub paid_cents: i64,
    /// Outstanding debt in cents after this payment was applied.
    /// Derived inside the payment transaction, never caller-supplied.
    pub debt_cents: i64,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub method: SettlementMethod,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_boundaries() {
        // At the minimum is low, one above is not
        assert_eq!(StockLevel::for_stock(10, 10), StockLevel::Low);
        assert_eq!(StockLevel::for_stock(11, 10), StockLevel::Healthy);

        // Half or below is critical
        assert_eq!(StockLevel::for_stock(5, 10), StockLevel::Critical);
        assert_eq!(StockLevel::for_stock(6, 10), StockLevel::Low);
        assert_eq!(StockLevel::for_stock(0, 0), StockLevel::Critical);
    }

    #[test]
    fn test_stock_level_needs_restock() {
        assert!(StockLevel::Low.needs_restock());
        assert!(StockLevel::Critical.needs_restock());
        assert!(!StockLevel::Healthy.needs_restock());
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(SettlementMethod::default(), SettlementMethod::Cash);
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_string(&PaymentMethod::Credit).unwrap();
        assert_eq!(json, "\"credit\"");

        let parsed: PaymentMethod = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Transfer);
    }

    #[test]
    fn test_customer_debt_helpers() {
        let now = Utc::now();
        let customer = Customer {
            id: "c1".to_string(),
            shop_id: "s1".to_string(),
            name: "Test Customer".to_string(),
            phone: None,
            address: None,
            province: None,
            district: None,
            total_debt_cents: 30000,
            total_paid_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(customer.has_debt());
        assert_eq!(customer.outstanding_debt().cents(), 30000);
    }
}
