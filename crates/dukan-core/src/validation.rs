//! # Validation Module
//!
//! Input validation and business rule checks for Dukan.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use dukan_core::validation::{validate_product_name, validate_quantity};
//!
//! // Validate before database insert
//! validate_product_name("Sugar 1kg").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreResult, ValidationError};
use crate::types::PaymentMethod;
use crate::{MAX_LINE_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Shared rule for required, length-capped text fields.
fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a shop name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_shop_name(name: &str) -> ValidationResult<()> {
    validate_required_text("shopName", name, 200)
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use dukan_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Sugar 1kg").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("productName", name, 200)
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_required_text("customerName", name, 200)
}

/// Validates a client-supplied idempotency token.
///
/// ## Rules
/// - When present: non-empty, at most 64 characters, no whitespace
pub fn validate_client_ref(client_ref: &str) -> ValidationResult<()> {
    if client_ref.is_empty() {
        return Err(ValidationError::Required {
            field: "clientRef".to_string(),
        });
    }

    if client_ref.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "clientRef".to_string(),
            max: 64,
        });
    }

    if client_ref.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidFormat {
            field: "clientRef".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or amount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, fully-paid sales carry zero debt)
///
/// ## Example
/// ```rust
/// use dukan_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 15000).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock count.
///
/// ## Rules
/// - Must be non-negative (>= 0); the ledger never goes below zero
pub fn validate_stock_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a debt payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0); settling nothing is not a payment
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "paidCents".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use dukan_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Sale Draft
// =============================================================================

/// One line of a sale about to be recorded.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A sale as submitted by the client, before it has an id or a shop.
///
/// The HTTP layer builds this from the request body, validates it with
/// [`validate_sale_draft`], then hands it to the sale repository which
/// writes the sale and all its items in one transaction.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub customer_id: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub debt_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub client_ref: Option<String>,
    pub items: Vec<SaleLine>,
}

/// Validates a sale draft against all sale invariants.
///
/// ## Invariants Checked
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. At least one item, at most MAX_SALE_ITEMS                           │
/// │  2. Every quantity in 1..=MAX_LINE_QUANTITY                             │
/// │  3. Every amount >= 0                                                   │
/// │  4. line_total == quantity × unit_price          (per line)             │
/// │  5. total == paid + debt                                                │
/// │  6. total == Σ line_totals                                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The totals are cross-checked rather than recomputed silently: a client
/// that disagrees with the server about arithmetic has a bug worth
/// surfacing, not papering over.
pub fn validate_sale_draft(draft: &SaleDraft) -> CoreResult<()> {
    if draft.items.is_empty() {
        return Err(crate::error::CoreError::SaleEmpty);
    }

    if draft.items.len() > MAX_SALE_ITEMS {
        return Err(crate::error::CoreError::SaleTooLarge {
            max: MAX_SALE_ITEMS,
        });
    }

    validate_price_cents("totalCents", draft.total_cents)?;
    validate_price_cents("paidCents", draft.paid_cents)?;
    validate_price_cents("debtCents", draft.debt_cents)?;

    if let Some(customer_id) = &draft.customer_id {
        validate_uuid(customer_id)?;
    }

    if let Some(client_ref) = &draft.client_ref {
        validate_client_ref(client_ref)?;
    }

    let mut items_sum: i64 = 0;
    for line in &draft.items {
        validate_uuid(&line.product_id)?;
        validate_quantity(line.quantity)?;
        validate_price_cents("unitPriceCents", line.unit_price_cents)?;
        validate_price_cents("lineTotalCents", line.line_total_cents)?;

        let expected_line = line.unit_price_cents * line.quantity;
        if line.line_total_cents != expected_line {
            return Err(ValidationError::AmountMismatch {
                field: "lineTotalCents".to_string(),
                expected_cents: expected_line,
                actual_cents: line.line_total_cents,
            }
            .into());
        }

        items_sum += line.line_total_cents;
    }

    let paid_plus_debt = draft.paid_cents + draft.debt_cents;
    if draft.total_cents != paid_plus_debt {
        return Err(ValidationError::AmountMismatch {
            field: "totalCents".to_string(),
            expected_cents: paid_plus_debt,
            actual_cents: draft.total_cents,
        }
        .into());
    }

    if draft.total_cents != items_sum {
        return Err(ValidationError::AmountMismatch {
            field: "totalCents".to_string(),
            expected_cents: items_sum,
            actual_cents: draft.total_cents,
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// Transactional Guards
// =============================================================================
// Pure rules applied by the repositories inside their transactions, after
// reading the current row state.

/// Rejects a debt payment larger than the outstanding debt.
pub fn guard_debt_payment(outstanding_cents: i64, requested_cents: i64) -> CoreResult<()> {
    validate_payment_amount(requested_cents)?;

    if requested_cents > outstanding_cents {
        return Err(crate::error::CoreError::DebtExceedsOutstanding {
            outstanding_cents,
            requested_cents,
        });
    }

    Ok(())
}

/// Rejects a price change whose claimed old price is no longer current.
pub fn guard_price_change(current_cents: i64, supplied_old_cents: i64) -> CoreResult<()> {
    if current_cents != supplied_old_cents {
        return Err(crate::error::CoreError::StalePriceChange {
            current_cents,
            supplied_cents: supplied_old_cents,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn line(qty: i64, unit: i64) -> SaleLine {
        SaleLine {
            product_id: uuid::Uuid::new_v4().to_string(),
            quantity: qty,
            unit_price_cents: unit,
            line_total_cents: qty * unit,
        }
    }

    fn cash_draft(items: Vec<SaleLine>) -> SaleDraft {
        let total: i64 = items.iter().map(|l| l.line_total_cents).sum();
        SaleDraft {
            customer_id: None,
            sale_date: Utc::now(),
            total_cents: total,
            paid_cents: total,
            debt_cents: 0,
            payment_method: PaymentMethod::Cash,
            notes: None,
            client_ref: None,
            items,
        }
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_shop_name("Test Shop").is_ok());
        assert!(validate_shop_name("").is_err());
        assert!(validate_shop_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
        assert!(validate_customer_name("Test Customer").is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("price", 0).is_ok());
        assert!(validate_price_cents("price", 15000).is_ok());
        assert!(validate_price_cents("price", -100).is_err());
    }

    #[test]
    fn test_validate_client_ref() {
        assert!(validate_client_ref("pos-7f3a").is_ok());
        assert!(validate_client_ref("").is_err());
        assert!(validate_client_ref("has space").is_err());
        assert!(validate_client_ref(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_sale_draft_happy_path() {
        let draft = cash_draft(vec![line(1, 15000)]);
        assert!(validate_sale_draft(&draft).is_ok());
    }

    #[test]
    fn test_sale_draft_rejects_empty() {
        let draft = cash_draft(vec![]);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(CoreError::SaleEmpty)
        ));
    }

    #[test]
    fn test_sale_draft_rejects_too_many_items() {
        let items: Vec<SaleLine> = (0..=MAX_SALE_ITEMS).map(|_| line(1, 100)).collect();
        let draft = cash_draft(items);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(CoreError::SaleTooLarge { .. })
        ));
    }

    #[test]
    fn test_sale_draft_rejects_line_total_mismatch() {
        let mut bad = line(2, 15000);
        bad.line_total_cents = 15000; // should be 30000
        let draft = cash_draft(vec![bad]);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(CoreError::Validation(ValidationError::AmountMismatch { .. }))
        ));
    }

    #[test]
    fn test_sale_draft_rejects_split_mismatch() {
        let mut draft = cash_draft(vec![line(1, 30000)]);
        draft.paid_cents = 10000;
        draft.debt_cents = 10000; // 10000 + 10000 != 30000
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(CoreError::Validation(ValidationError::AmountMismatch { .. }))
        ));
    }

    #[test]
    fn test_sale_draft_rejects_total_vs_items_mismatch() {
        let mut draft = cash_draft(vec![line(1, 30000)]);
        draft.total_cents = 29000;
        draft.paid_cents = 29000; // split holds, item sum does not
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(CoreError::Validation(ValidationError::AmountMismatch { .. }))
        ));
    }

    #[test]
    fn test_sale_draft_credit_split() {
        let mut draft = cash_draft(vec![line(1, 30000)]);
        draft.payment_method = PaymentMethod::Credit;
        draft.paid_cents = 0;
        draft.debt_cents = 30000;
        draft.customer_id = Some(uuid::Uuid::new_v4().to_string());
        assert!(validate_sale_draft(&draft).is_ok());
    }

    #[test]
    fn test_guard_debt_payment() {
        assert!(guard_debt_payment(30000, 10000).is_ok());
        assert!(guard_debt_payment(30000, 30000).is_ok());

        assert!(matches!(
            guard_debt_payment(30000, 50000),
            Err(CoreError::DebtExceedsOutstanding { .. })
        ));
        assert!(guard_debt_payment(30000, 0).is_err());
        assert!(guard_debt_payment(30000, -5).is_err());
    }

    #[test]
    fn test_guard_price_change() {
        assert!(guard_price_change(15000, 15000).is_ok());
        assert!(matches!(
            guard_price_change(16000, 15000),
            Err(CoreError::StalePriceChange { .. })
        ));
    }
}
