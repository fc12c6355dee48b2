//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Flow in Dukan                               │
//! │                                                                         │
//! │  Web Client                  Rust Backend                               │
//! │  ──────────                  ────────────                               │
//! │                                                                         │
//! │  POST /api/sales                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ── totals don't add up ──► 400 VALIDATION_ERROR │  │
//! │  │  DbError::UniqueViolation ── duplicate ───► 409 CONFLICT         │  │
//! │  │  Cross-shop id ───────────────────────────► 403 FORBIDDEN        │  │
//! │  │  No shop for caller ──────────────────────► 404 NOT_FOUND        │  │
//! │  │  Pool closed (write path) ────────────────► 503 UNAVAILABLE      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── { "code": "CONFLICT", "message": "..." } ─────────────────────────  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read paths do NOT route unavailability through this type: list
//! endpoints degrade to empty collections and dashboard stats to zeros,
//! so the client can render a partial page while the store is down.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use dukan_core::{CoreError, ValidationError};
use dukan_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// { "code": "NOT_FOUND", "message": "No shop exists for this account" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error codes for API responses, each implying an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Resource exists but belongs to another shop (403)
    Forbidden,

    /// No shop for the caller, or missing resource (404)
    NotFound,

    /// Duplicate shop, duplicate daily close, stale price change (409)
    Conflict,

    /// Input shape or invariant violation (400)
    ValidationError,

    /// Persistence layer unreachable on a write path (503)
    Unavailable,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    /// The HTTP status this code maps to.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// True when the underlying cause is an unreachable persistence
    /// layer. The degraded read paths key off this.
    pub fn is_unavailable(&self) -> bool {
        self.code == ErrorCode::Unavailable
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => ApiError::new(
                ErrorCode::Unavailable,
                "The data store is temporarily unavailable",
            ),
            DbError::Domain(core) => core.into(),
            DbError::MigrationFailed(_) | DbError::QueryFailed(_) | DbError::Internal(_) => {
                ApiError::new(ErrorCode::Internal, err.to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            // The claimed old price lost a race against another change
            CoreError::StalePriceChange { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            CoreError::SaleEmpty
            | CoreError::SaleTooLarge { .. }
            | CoreError::DebtExceedsOutstanding { .. }
            | CoreError::Validation(_) => ApiError::new(ErrorCode::ValidationError, err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationError, err.to_string())
    }
}
