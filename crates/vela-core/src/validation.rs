//! # Validation Module
//!
//! Field-level input validation, run before any core operation touches
//! state. Nothing here silently coerces: malformed input comes back as a
//! typed [`ValidationError`] naming the offending field.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (out of scope)                                     │
//! │  └── Type validation via deserialization                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field rules                                    │
//! │  └── Lengths, positivity, required combinations                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── CHECK / NOT NULL / FK constraints as the last line                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{MovementInput, MovementType, PurchaseOrderInput};
use crate::{MAX_NOTE_LEN, MAX_ORDER_NOTE_LEN, MAX_SUPPLIER_FIELD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an entity id field (product_id, unit_id, item_id).
///
/// Ids are opaque strings here (the catalog owns their format); they just
/// must be present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an optional free-text field against a length cap.
pub fn validate_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    if let Some(value) = value {
        if value.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(())
}

/// Validates a non-negative cost in minor units.
pub fn validate_cost(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates that a string is a well-formed UUID.
///
/// Entity primary keys are UUID v4 strings; a malformed one can only be a
/// caller bug, so it is rejected up front instead of becoming a silent
/// not-found.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "not a valid UUID".to_string(),
    })?;
    Ok(())
}

/// Validates an exchange rate multiplier.
pub fn validate_exchange_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "exchange_rate".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Operation Input Validators
// =============================================================================

/// Validates a stock movement before it is appended to the ledger.
///
/// ## Rules
/// - `qty > 0` (the sign comes from the type/mode, never from the quantity)
/// - ADJUST requires an adjust mode
/// - required ids, note length
pub fn validate_movement_input(input: &MovementInput) -> CoreResult<()> {
    validate_id("product_id", &input.product_id)?;
    validate_id("unit_id", &input.unit_id)?;
    validate_text("note", input.note.as_deref(), MAX_NOTE_LEN)?;

    if input.qty <= 0 {
        return Err(CoreError::InvalidQuantity { qty: input.qty });
    }

    if input.movement_type == MovementType::Adjust && input.adjust_mode.is_none() {
        return Err(CoreError::MissingAdjustMode);
    }

    Ok(())
}

/// Validates a purchase order creation input.
///
/// ## Rules
/// - at least one item; each `qty_ordered > 0`, `unit_cost_purchase >= 0`
/// - `exchange_rate > 0`, landed costs non-negative
/// - field length caps (supplier 100, notes 240/500)
pub fn validate_purchase_order_input(input: &PurchaseOrderInput) -> CoreResult<()> {
    validate_text(
        "supplier_name",
        input.supplier_name.as_deref(),
        MAX_SUPPLIER_FIELD_LEN,
    )?;
    validate_text(
        "supplier_contact",
        input.supplier_contact.as_deref(),
        MAX_SUPPLIER_FIELD_LEN,
    )?;
    validate_text(
        "other_cost_note",
        input.other_cost_note.as_deref(),
        MAX_NOTE_LEN,
    )?;
    validate_text("note", input.note.as_deref(), MAX_ORDER_NOTE_LEN)?;
    validate_exchange_rate(input.exchange_rate)?;
    validate_cost("shipping_cost", input.shipping_cost)?;
    validate_cost("other_cost", input.other_cost)?;

    if input.items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }

    for item in &input.items {
        validate_id("product_id", &item.product_id)?;
        if item.qty_ordered <= 0 {
            return Err(CoreError::InvalidQuantity {
                qty: item.qty_ordered,
            });
        }
        validate_cost("unit_cost_purchase", item.unit_cost_purchase)?;
    }

    Ok(())
}

/// Validates tracking info passed on a status update.
pub fn validate_tracking_info(tracking: Option<&str>) -> ValidationResult<()> {
    validate_text("tracking_info", tracking, MAX_NOTE_LEN)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdjustMode, PurchaseCurrency, PurchaseItemInput};

    fn movement(qty: i64) -> MovementInput {
        MovementInput {
            product_id: "prod-1".into(),
            unit_id: "unit-1".into(),
            movement_type: MovementType::In,
            qty,
            adjust_mode: None,
            note: None,
        }
    }

    fn order() -> PurchaseOrderInput {
        PurchaseOrderInput {
            supplier_name: Some("Vientiane Wholesale".into()),
            supplier_contact: None,
            purchase_currency: PurchaseCurrency::Lak,
            exchange_rate: 1.0,
            shipping_cost: 0,
            other_cost: 0,
            other_cost_note: None,
            note: None,
            expected_at: None,
            items: vec![PurchaseItemInput {
                product_id: "prod-1".into(),
                qty_ordered: 50,
                unit_cost_purchase: 1000,
            }],
            receive_immediately: false,
        }
    }

    #[test]
    fn test_movement_quantity_must_be_positive() {
        assert!(validate_movement_input(&movement(1)).is_ok());
        assert!(matches!(
            validate_movement_input(&movement(0)),
            Err(CoreError::InvalidQuantity { qty: 0 })
        ));
        assert!(matches!(
            validate_movement_input(&movement(-5)),
            Err(CoreError::InvalidQuantity { qty: -5 })
        ));
    }

    #[test]
    fn test_adjust_requires_mode() {
        let mut input = movement(5);
        input.movement_type = MovementType::Adjust;
        assert!(matches!(
            validate_movement_input(&input),
            Err(CoreError::MissingAdjustMode)
        ));

        input.adjust_mode = Some(AdjustMode::Decrease);
        assert!(validate_movement_input(&input).is_ok());
    }

    #[test]
    fn test_movement_note_length() {
        let mut input = movement(5);
        input.note = Some("x".repeat(240));
        assert!(validate_movement_input(&input).is_ok());

        input.note = Some("x".repeat(241));
        assert!(validate_movement_input(&input).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("order_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(matches!(
            validate_uuid("order_id", "not-a-uuid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_uuid("order_id", "").is_err());
    }

    #[test]
    fn test_movement_requires_ids() {
        let mut input = movement(5);
        input.product_id = "  ".into();
        assert!(validate_movement_input(&input).is_err());
    }

    #[test]
    fn test_order_requires_items() {
        let mut input = order();
        input.items.clear();
        assert!(matches!(
            validate_purchase_order_input(&input),
            Err(CoreError::EmptyOrder)
        ));
    }

    #[test]
    fn test_order_item_rules() {
        let mut input = order();
        input.items[0].qty_ordered = 0;
        assert!(matches!(
            validate_purchase_order_input(&input),
            Err(CoreError::InvalidQuantity { .. })
        ));

        let mut input = order();
        input.items[0].unit_cost_purchase = -1;
        assert!(validate_purchase_order_input(&input).is_err());

        // Zero unit cost is fine (free samples)
        let mut input = order();
        input.items[0].unit_cost_purchase = 0;
        assert!(validate_purchase_order_input(&input).is_ok());
    }

    #[test]
    fn test_exchange_rate_must_be_positive() {
        let mut input = order();
        input.exchange_rate = 0.0;
        assert!(validate_purchase_order_input(&input).is_err());

        input.exchange_rate = -2.5;
        assert!(validate_purchase_order_input(&input).is_err());

        input.exchange_rate = f64::NAN;
        assert!(validate_purchase_order_input(&input).is_err());

        input.exchange_rate = 580.0;
        assert!(validate_purchase_order_input(&input).is_ok());
    }

    #[test]
    fn test_supplier_field_lengths() {
        let mut input = order();
        input.supplier_name = Some("x".repeat(101));
        assert!(validate_purchase_order_input(&input).is_err());

        let mut input = order();
        input.note = Some("x".repeat(501));
        assert!(validate_purchase_order_input(&input).is_err());

        let mut input = order();
        input.note = Some("x".repeat(500));
        assert!(validate_purchase_order_input(&input).is_ok());
    }
}
