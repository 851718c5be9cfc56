//! # Validation Module
//!
//! Input validation for client-supplied checkout and address data.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: Frontend (TypeScript)   - immediate user feedback
//! Layer 2: API handlers (Rust)     - THIS MODULE, before any DB work
//! Layer 3: Database (SQLite)       - NOT NULL / UNIQUE / CHECK constraints
//!
//! Defense in depth: multiple layers catch different errors.
//! ```

use crate::error::ValidationError;
use crate::types::{AddressInput, CartLine};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a quantity value.
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

/// Validates a submitted cart.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed MAX_CART_LINES lines
/// - Every line needs a product id, a variant id and a valid quantity
///
/// The first violated constraint is reported; stock and existence checks
/// happen later, inside the checkout transaction.
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in lines {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "productId".to_string(),
            });
        }
        if line.variant_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "variantId".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Address Validators
// =============================================================================

/// Minimum field lengths for a shipping address.
///
/// These mirror what the storefront form enforces; the postcode minimum is
/// deliberately loose because formats vary by country.
const MIN_NAME: usize = 2;
const MIN_STREET: usize = 5;
const MIN_CITY: usize = 2;
const MIN_POSTCODE: usize = 3;
const MIN_PHONE: usize = 10;
const MAX_FIELD: usize = 200;

/// Validates a submitted shipping address.
pub fn validate_address(address: &AddressInput) -> ValidationResult<()> {
    check_field("name", &address.name, MIN_NAME)?;
    check_field("street", &address.street, MIN_STREET)?;
    check_field("city", &address.city, MIN_CITY)?;
    check_field("postcode", &address.postcode, MIN_POSTCODE)?;
    check_field("phone", &address.phone, MIN_PHONE)?;

    if let Some(country) = &address.country {
        if country.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "country".to_string(),
            });
        }
    }

    Ok(())
}

fn check_field(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if value.chars().count() > MAX_FIELD {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FIELD,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
