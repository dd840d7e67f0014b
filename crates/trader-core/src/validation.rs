//! # Validation Module
//!
//! Input validation for cart operations, run before an order is mutated.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (storefront, API)                                     │
//! │  └── Basic format checks, immediate shopper feedback                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartApplication / Order mutators                             │
//! │  └── THIS MODULE: quantity, line count, coupon and country rules       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Refresh pipeline                                             │
//! │  └── Unknown purchasables and profiles are dropped or abort            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use trader_core::validation::{validate_coupon_code, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(validate_coupon_code("  summer10 ").unwrap(), "summer10");
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MAX_COUPON_CODE_LENGTH, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## Cart Workflow
/// ```text
/// add_or_update_line(line, purchasable, 5)
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?   → MustBePositive
///      ├── qty > 999?  → OutOfRange
///      └── OK          → line added, order refreshed
/// ```
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

/// Validates that one more line fits on the order.
pub fn validate_line_count(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most MAX_COUPON_CODE_LENGTH characters
/// - Letters, digits, hyphens and underscores only
///
/// Case is preserved; matching against promos is case-insensitive.
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon_code".to_string(),
        });
    }

    if code.chars().count() > MAX_COUPON_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "coupon_code".to_string(),
            max: MAX_COUPON_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Validates an ISO 3166-1 alpha-2 country code ("BE").
pub fn validate_country_code(code: &str) -> ValidationResult<()> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "country_id".to_string(),
            reason: "must be two uppercase letters".to_string(),
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

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(0).is_ok());
        assert!(validate_line_count(MAX_CART_LINES - 1).is_ok());
        assert!(validate_line_count(MAX_CART_LINES).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code(" SUMMER-10 ").unwrap(), "SUMMER-10");
        assert!(matches!(
            validate_coupon_code("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_coupon_code("10% off"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_coupon_code(&"A".repeat(MAX_COUPON_CODE_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("BE").is_ok());
        assert!(validate_country_code("be").is_err());
        assert!(validate_country_code("BEL").is_err());
    }
}
