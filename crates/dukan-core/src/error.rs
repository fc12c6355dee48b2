//! # Error Types
//!
//! Domain-specific error types for dukan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dukan-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dukan-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What the web client sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Sale submitted with no line items.
    #[error("A sale must contain at least one item")]
    SaleEmpty,

    /// Sale has exceeded maximum allowed line items.
    #[error("A sale cannot have more than {max} items")]
    SaleTooLarge { max: usize },

    /// Debt payment exceeds the customer's outstanding debt.
    ///
    /// ## When This Occurs
    /// - Two clerks settle the same debt concurrently
    /// - The client UI shows a stale outstanding figure
    ///
    /// ## User Workflow
    /// ```text
    /// Record payment (Rs 500.00)
    ///      │
    ///      ▼
    /// Outstanding debt: Rs 300.00
    ///      │
    ///      ▼
    /// DebtExceedsOutstanding { outstanding: 30000, requested: 50000 }
    ///      │
    ///      ▼
    /// UI shows: "Customer only owes Rs 300.00"
    /// ```
    #[error(
        "Payment of {requested_cents} cents exceeds outstanding debt of {outstanding_cents} cents"
    )]
    DebtExceedsOutstanding {
        outstanding_cents: i64,
        requested_cents: i64,
    },

    /// Price change submitted against a price that is no longer current.
    ///
    /// ## When This Occurs
    /// - Two browser tabs both open the price dialog, one saves first
    /// - The supplied old price must match the live selling price exactly
    #[error(
        "Price change expected current price {supplied_cents} cents but it is {current_cents} cents"
    )]
    StalePriceChange {
        current_cents: i64,
        supplied_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two monetary figures that must agree do not.
    ///
    /// Covers the sale invariants: total = paid + debt,
    /// line total = quantity × unit price, total = Σ line totals.
    #[error("{field} mismatch: expected {expected_cents} cents, got {actual_cents} cents")]
    AmountMismatch {
        field: String,
        expected_cents: i64,
        actual_cents: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
