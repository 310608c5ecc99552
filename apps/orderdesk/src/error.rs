//! # API Error Type
//!
//! Unified error type returned by every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in OrderDesk                              │
//! │                                                                         │
//! │  OrderService::create(new_order)                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation Error? ─── ValidationError::MustBePositive ──┐             │
//! │         │                                                 │             │
//! │         ▼                                                 │             │
//! │  Pricing Error? ────── PricingError::InvalidAmount ──────┤             │
//! │         │                                                 ▼             │
//! │         ▼                                             ApiError          │
//! │  Database Error? ───── DbError::ForeignKeyViolation ────► { code,       │
//! │         │                                                 message }     │
//! │         ▼                                                               │
//! │  Success → OrderDto                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Callers receive both a machine-readable `code` and a human-readable
//! `message`:
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "items[0].price must be greater than zero"
//! }
//! ```

use orderdesk_core::{CoreError, PricingError, ValidationError};
use orderdesk_db::DbError;
use serde::Serialize;

/// Error returned from service operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Stable category callers can branch on.
    pub code: ErrorCode,

    /// Text for people; may change between releases.
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Resource already exists or is still referenced (409)
    Conflict,

    /// Business rule violation such as an illegal status change (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }
}

/// Storage failures keep their details in the log; callers only learn
/// which kind of failure happened.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } if value.is_empty() => {
                ApiError::conflict(format!("{} already exists", field))
            }
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { ref message } => {
                tracing::warn!(%message, "Rejected by foreign key");
                ApiError::conflict("Referenced record is missing or still in use")
            }
            DbError::CheckViolation(ref message) => {
                tracing::warn!(%message, "Rejected by check constraint");
                ApiError::validation("Value rejected by database constraint")
            }
            DbError::PoolExhausted => {
                tracing::warn!("No database connection available");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            other => {
                tracing::error!(error = %other, "Database failure");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Duplicate { .. } => ApiError::conflict(err.to_string()),
            other => ApiError::validation(other.to_string()),
        }
    }
}

/// Pricing rejects bad input, so it is a validation failure for the caller.
impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::CustomerHasOrders { .. } => ApiError::conflict(err.to_string()),
            CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::AmountOutOfRange(_) => ApiError::validation(err.to_string()),
            CoreError::Pricing(e) => e.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_amount_is_validation_error() {
        let err: ApiError = PricingError::InvalidAmount(dec!(-10)).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("-10"));

        let err: ApiError = CoreError::Pricing(PricingError::InvalidAmount(dec!(-1))).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::CustomerNotFound("abc".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Customer not found: abc");

        let err: ApiError = CoreError::CustomerHasOrders {
            customer_id: "abc".to_string(),
            order_count: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = CoreError::InvalidStatusTransition {
            order_id: "o1".to_string(),
            from: "completed".to_string(),
            to: "pending".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_db_error_codes() {
        let err: ApiError = DbError::duplicate("email", "ana@example.com").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::not_found("Order", "o1").into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = DbError::QueryFailed("syntax error near SELEC".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));
    }

    #[test]
    fn test_serialization() {
        let err = ApiError::not_found("Order", "o1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o1");
    }
}
