//! # Error Types
//!
//! Domain-specific error types for trader-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  trader-core errors (this file)                                        │
//! │  ├── CoreError        - Domain, collaborator and invariant failures    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  trader-store errors (separate crate)                                  │
//! │  └── StoreError       - Collaborator failures, mapped into CoreError   │
//! │                                                                         │
//! │  Flow: StoreError → CoreError → refresh aborts, nothing is persisted   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! - Collaborator failures (`Lookup`, `ShippingProfileNotFound`,
//!   `VersionConflict`) abort a refresh.
//! - `InvalidCondition` / `InvalidDiscount` are produced while parsing promo
//!   data but the promo engine absorbs them as "does not apply".
//! - `RoundingInvariantViolation` is an internal bug, never a user condition.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order cannot be found by the order store.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Line does not exist on the order.
    #[error("Line {line_id} not found on order {order_id}")]
    LineNotFound { order_id: String, line_id: String },

    /// A discount points at an order, line, shipping or payment that is not
    /// part of the order.
    ///
    /// ## When This Occurs
    /// - A line was removed after its discount was computed
    /// - Shipping was never chosen but a shipping promo targets it
    #[error("Discountable {kind} '{id}' not found on order")]
    DiscountableNotFound { kind: String, id: String },

    /// The selected shipping profile no longer exists.
    ///
    /// This is an order-level dependency: the whole refresh aborts.
    #[error("Shipping profile not found: {0}")]
    ShippingProfileNotFound(String),

    /// No active promo matches the entered coupon code.
    #[error("No active promo for coupon code '{0}'")]
    CouponNotFound(String),

    /// A promo condition has malformed configuration.
    #[error("Invalid condition '{key}': {reason}")]
    InvalidCondition { key: String, reason: String },

    /// A promo discount definition has malformed configuration.
    #[error("Invalid discount '{key}': {reason}")]
    InvalidDiscount { key: String, reason: String },

    /// A percentage string could not be parsed or is out of range.
    #[error("Invalid percentage '{value}': {reason}")]
    InvalidPercentage { value: String, reason: String },

    /// The parts of an allocation or snapshot do not add up to the whole.
    ///
    /// ## When This Occurs
    /// Never in a correct build. It signals a bug in the allocator or the
    /// VAT snapshot and must fail loudly in tests.
    #[error("Rounding invariant violated: expected {expected}, got {actual}")]
    RoundingInvariantViolation { expected: i64, actual: i64 },

    /// A collaborator (price lookup, VAT rates, ...) failed.
    #[error("{collaborator} lookup failed: {message}")]
    Lookup {
        collaborator: String,
        message: String,
    },

    /// The order was saved by someone else since it was loaded.
    #[error("Order {order_id} version conflict: expected {expected}, found {found}")]
    VersionConflict {
        order_id: String,
        expected: u64,
        found: u64,
    },

    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Lookup error for a collaborator.
    pub fn lookup(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Lookup {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidCondition error.
    pub fn invalid_condition(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidCondition {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidDiscount error.
    pub fn invalid_discount(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidDiscount {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before an order is mutated.
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

    /// Invalid format (e.g. lowercase country code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
