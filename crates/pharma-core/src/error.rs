//! # Error Types
//!
//! Domain-specific error types for pharma-core.
//!
//! ## Error Hierarchy
//! ```text
//! pharma-core errors (this file)
//! ├── CoreError        - Business rule violations (checkout, status)
//! └── ValidationError  - Input validation failures
//!
//! pharma-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! storefront-api errors (in app)
//! └── ApiError         - What the client sees (serialized code + message)
//!
//! Flow: ValidationError → CoreError → DbError → ApiError → client
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (variant id, product name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. All of them abort the
/// surrounding checkout transaction - there are no partial commits.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line references a variant that does not exist.
    #[error("Product variant not found: {0}")]
    VariantNotFound(String),

    /// Requested quantity exceeds available stock.
    ///
    /// Named after the product (not the variant) because that is what the
    /// customer sees in their cart.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Requested status change is not a legal transition.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
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
/// These occur when client input doesn't meet requirements. Used for early
/// validation before any business logic or database work runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Serenix 10mg".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Serenix 10mg: available 1, requested 2"
        );

        let err = CoreError::VariantNotFound("v-missing".to_string());
        assert_eq!(err.to_string(), "Product variant not found: v-missing");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "street".to_string(),
        };
        assert_eq!(err.to_string(), "street is required");

        let err = ValidationError::TooShort {
            field: "phone".to_string(),
            min: 10,
        };
        assert_eq!(err.to_string(), "phone must be at least 10 characters");

        assert_eq!(ValidationError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyCart;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
