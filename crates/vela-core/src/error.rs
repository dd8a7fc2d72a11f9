//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  vela-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures + concurrency conflicts       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, statuses, etc.)
//! 3. Errors are enum variants, never String
//! 4. Callers can discriminate retry-safe from fatal outcomes by variant

use thiserror::Error;

use crate::types::PurchaseStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. They are raised before any
/// state change, so a caller that sees one knows nothing was committed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Movement quantity must be a positive integer.
    #[error("Invalid quantity {qty}: must be greater than zero")]
    InvalidQuantity { qty: i64 },

    /// ADJUST movements must say which direction they adjust in.
    #[error("Adjust movements require an adjust mode (increase or decrease)")]
    MissingAdjustMode,

    /// A decrease would drive on-hand below zero.
    ///
    /// ## When This Occurs
    /// - ADJUST/DECREASE larger than the current on-hand quantity
    ///
    /// On-hand is a physical count; it cannot go negative. Corrections for
    /// genuinely missing stock are recorded as a decrease of what is there,
    /// never as negative inventory.
    #[error("Insufficient stock for product {product_id}: on hand {on_hand}, requested decrease {requested}")]
    InsufficientStock {
        product_id: String,
        on_hand: i64,
        requested: i64,
    },

    /// Purchase orders need at least one line item.
    #[error("Purchase order must contain at least one item")]
    EmptyOrder,

    /// The requested status change is not allowed by the state machine.
    ///
    /// RECEIVED and CANCELLED are terminal; this is also what a retried
    /// receive sees (from == to == Received), which is how double-posting
    /// is prevented.
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },

    /// Purchase order not found.
    #[error("Purchase order not found: {0}")]
    OrderNotFound(String),

    /// A received_items entry referenced an item not on the order.
    #[error("Order item not found: {item_id} on order {order_id}")]
    ItemNotFound { order_id: String, item_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet field-level requirements.
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

    /// Invalid format (e.g., invalid UUID).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "prod-1".to_string(),
            on_hand: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product prod-1: on hand 3, requested decrease 5"
        );

        let err = CoreError::InvalidTransition {
            from: PurchaseStatus::Received,
            to: PurchaseStatus::Shipped,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition: Received -> Shipped"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        assert_eq!(err.to_string(), "product_id is required");

        let err = ValidationError::TooLong {
            field: "note".to_string(),
            max: 240,
        };
        assert_eq!(err.to_string(), "note must be at most 240 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "exchange_rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
