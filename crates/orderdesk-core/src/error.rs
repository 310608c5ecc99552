//! # Error Types
//!
//! Domain-specific error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  ├── PricingError     - Pricing engine input rejection                 │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CoreError        - Business rule violations                       │
//! │                                                                         │
//! │  orderdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  apps/orderdesk errors                                                 │
//! │  └── ApiError         - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: PricingError/ValidationError → CoreError → ApiError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// The single failure kind of the pricing engine.
///
/// Raised before any arithmetic whenever an amount is negative. The engine
/// never clamps a negative input to zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Invalid amount {0}: must not be negative")]
    InvalidAmount(Decimal),
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The app layer
/// translates them into caller-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer still owns orders and cannot be removed.
    ///
    /// ## User Workflow
    /// ```text
    /// delete_customer(id)
    ///      │
    ///      ▼
    /// count orders for customer: 3
    ///      │
    ///      ▼
    /// CustomerHasOrders { customer_id, order_count: 3 }
    /// ```
    #[error("Customer {customer_id} has {order_count} order(s) and cannot be deleted")]
    CustomerHasOrders {
        customer_id: String,
        order_count: i64,
    },

    /// Order is not in a state that allows the requested transition.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// A money value cannot be represented as integer cents.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),

    /// Pricing engine rejected an amount.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must be strictly positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Monetary value has more fractional digits than cents allow.
    #[error("{field} must have at most {max} decimal places")]
    TooManyDecimals { field: String, max: u32 },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., an email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pricing_error_message() {
        let err = PricingError::InvalidAmount(dec!(-10));
        assert_eq!(err.to_string(), "Invalid amount -10: must not be negative");
    }

    #[test]
    fn test_customer_has_orders_message() {
        let err = CoreError::CustomerHasOrders {
            customer_id: "c-1".to_string(),
            order_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Customer c-1 has 2 order(s) and cannot be deleted"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooManyDecimals {
            field: "price".to_string(),
            max: 2,
        };
        assert_eq!(err.to_string(), "price must have at most 2 decimal places");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = PricingError::InvalidAmount(dec!(-1)).into();
        assert!(matches!(core_err, CoreError::Pricing(_)));
    }
}
