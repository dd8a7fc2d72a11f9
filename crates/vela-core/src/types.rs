//! # Domain Types
//!
//! Core domain types for the inventory ledger and purchase-order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐      │
//! │  │  StockMovement  │   │  StockBalance   │   │  PurchaseOrder   │      │
//! │  │  ─────────────  │──►│  ─────────────  │   │  ──────────────  │      │
//! │  │  id (UUID)      │   │  on_hand        │◄──│  id (UUID)       │      │
//! │  │  type IN/ADJ/RET│   │  reserved       │   │  status          │      │
//! │  │  qty (> 0)      │   │  available      │   │  items (>= 1)    │      │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘      │
//! │                                                                         │
//! │  Movements are the append-only source of truth; the balance is a       │
//! │  synchronously maintained projection. Receiving a purchase order is    │
//! │  the only producer of purchase-sourced IN movements.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (barcode, order reference) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Store Context
// =============================================================================

/// The acting store and user, resolved by the authorization layer.
///
/// Every core operation takes this explicitly. The core performs no
/// authentication itself and never reads ambient session state; by the time
/// a context reaches this crate the caller has already been authorized for
/// the named permission on `store_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreContext {
    /// Store (tenant scope) all reads and writes are keyed by.
    pub store_id: String,
    /// User recorded as the actor on audit fields.
    pub user_id: String,
}

impl StoreContext {
    pub fn new(store_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        StoreContext {
            store_id: store_id.into(),
            user_id: user_id.into(),
        }
    }
}

// =============================================================================
// Stock Movements
// =============================================================================

/// The kind of change a movement applies to on-hand stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods arriving (purchase receipt, opening stock).
    In,
    /// Manual correction; direction given by [`AdjustMode`].
    Adjust,
    /// Customer return coming back on hand.
    Return,
}

/// Direction of an ADJUST movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustMode {
    Increase,
    Decrease,
}

/// One immutable, signed change to on-hand quantity.
///
/// ## Invariant
/// A movement is never edited or deleted once written. Corrections are new
/// movements (usually an ADJUST in the opposite direction).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub store_id: String,
    pub product_id: String,
    /// Base unit the quantity is expressed in.
    pub unit_id: String,
    pub movement_type: MovementType,
    /// Always positive; the sign comes from the type/mode.
    pub qty: i64,
    /// Required iff `movement_type` is Adjust.
    pub adjust_mode: Option<AdjustMode>,
    pub note: Option<String>,
    /// Purchase order this movement was posted by, for IN movements
    /// produced by receiving. Audit link only.
    pub source_order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl StockMovement {
    /// Signed effect of this movement on `on_hand`.
    ///
    /// IN and RETURN add; ADJUST adds or subtracts by mode. `reserved` is
    /// never touched by movements (it is owned by the order-reservation
    /// flow).
    pub fn on_hand_delta(&self) -> i64 {
        match self.movement_type {
            MovementType::In | MovementType::Return => self.qty,
            MovementType::Adjust => match self.adjust_mode {
                Some(AdjustMode::Increase) => self.qty,
                Some(AdjustMode::Decrease) => -self.qty,
                // Unreachable through validation and the schema CHECK;
                // constructing an ADJUST without a mode is a caller bug.
                None => {
                    debug_assert!(false, "adjust movement without adjust_mode");
                    self.qty
                }
            },
        }
    }
}

/// Caller input for recording a movement. The acting store and user come
/// from the [`StoreContext`], not from this value.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementInput {
    pub product_id: String,
    pub unit_id: String,
    pub movement_type: MovementType,
    pub qty: i64,
    pub adjust_mode: Option<AdjustMode>,
    pub note: Option<String>,
}

// =============================================================================
// Stock Balance
// =============================================================================

/// Derived balance projection, one row per (store, product).
///
/// Created implicitly on the first movement, mutated only by applying
/// movements, never deleted (only zeroed).
///
/// ## Invariant
/// `available == on_hand - reserved` after every applied movement.
/// `on_hand >= 0` is a hard invariant; decreases that would break it are
/// rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockBalance {
    pub store_id: String,
    pub product_id: String,
    /// Physically present quantity, in the product's base unit.
    pub on_hand: i64,
    /// Quantity committed to unfulfilled orders (owned by the reservation
    /// flow; movements never change it).
    pub reserved: i64,
    /// `on_hand - reserved`. Negative means backorder.
    pub available: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockBalance {
    /// All-zero balance for a pair that has no movements yet.
    pub fn empty(store_id: &str, product_id: &str) -> Self {
        StockBalance {
            store_id: store_id.to_string(),
            product_id: product_id.to_string(),
            on_hand: 0,
            reserved: 0,
            available: 0,
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// Currency a purchase order is priced in.
///
/// Only a stored exchange-rate multiplier accompanies non-base currencies;
/// conversion itself is a reporting concern, not done here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseCurrency {
    Lak,
    Thb,
    Usd,
}

/// Purchase order lifecycle.
///
/// ```text
/// ORDERED ──► SHIPPED ──► RECEIVED (terminal)
///    │           │
///    └───────────┴──────► CANCELLED (terminal)
/// ```
///
/// `receive_immediately` at creation is a shortcut straight into RECEIVED
/// and performs the same receiving side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Ordered,
    Shipped,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    /// Whether the state machine permits `self -> next`.
    ///
    /// Terminal states permit nothing, which is also the double-receive
    /// guard: a second RECEIVED request fails here before any posting.
    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        matches!(
            (self, next),
            (Ordered, Shipped)
                | (Ordered, Received)
                | (Ordered, Cancelled)
                | (Shipped, Received)
                | (Shipped, Cancelled)
        )
    }

    /// RECEIVED and CANCELLED accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, PurchaseStatus::Received | PurchaseStatus::Cancelled)
    }
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Ordered
    }
}

/// A supplier purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub store_id: String,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub purchase_currency: PurchaseCurrency,
    /// Multiplier to the store's base currency. Stored, never applied here.
    pub exchange_rate: f64,
    /// Landed-cost addition in the purchase currency's smallest unit.
    pub shipping_cost: i64,
    /// Further landed-cost addition (customs, handling, ...).
    pub other_cost: i64,
    pub other_cost_note: Option<String>,
    pub note: Option<String>,
    /// Carrier reference, recorded when the order ships.
    pub tracking_info: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_at: Option<DateTime<Utc>>,
    pub status: PurchaseStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    /// Shipping + other cost, in the purchase currency.
    ///
    /// These are recorded on the order for the reporting layer; they are
    /// never distributed into per-item unit costs here.
    pub fn landed_cost_total(&self) -> Money {
        Money::from_minor(self.shipping_cost) + Money::from_minor(self.other_cost)
    }
}

/// A line item on a purchase order, owned exclusively by the order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub qty_ordered: i64,
    /// In the purchase currency's smallest unit.
    pub unit_cost_purchase: i64,
    /// Set when the order is received; clamped to `[0, qty_ordered]`.
    pub qty_received: i64,
}

impl PurchaseOrderItem {
    /// Ordered cost of this line.
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_minor(self.unit_cost_purchase).multiply_quantity(self.qty_ordered)
    }
}

// =============================================================================
// Purchase Order Inputs
// =============================================================================

/// One line of a new purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseItemInput {
    pub product_id: String,
    pub qty_ordered: i64,
    pub unit_cost_purchase: i64,
}

/// Caller input for creating a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderInput {
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub purchase_currency: PurchaseCurrency,
    pub exchange_rate: f64,
    pub shipping_cost: i64,
    pub other_cost: i64,
    pub other_cost_note: Option<String>,
    pub note: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_at: Option<DateTime<Utc>>,
    pub items: Vec<PurchaseItemInput>,
    /// Shortcut: create the order already received, posting stock in the
    /// same transaction.
    #[serde(default)]
    pub receive_immediately: bool,
}

/// Received quantity for one order item, passed on a RECEIVED transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceivedItem {
    pub item_id: String,
    pub qty_received: i64,
}

/// Caller input for a status transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusUpdate {
    pub status: PurchaseStatus,
    pub tracking_info: Option<String>,
    /// Only meaningful on a RECEIVED transition. When omitted, every item
    /// defaults to its full ordered quantity.
    pub received_items: Option<Vec<ReceivedItem>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_hand_delta_by_type() {
        let mut movement = StockMovement {
            id: "m1".into(),
            store_id: "s1".into(),
            product_id: "p1".into(),
            unit_id: "u1".into(),
            movement_type: MovementType::In,
            qty: 5,
            adjust_mode: None,
            note: None,
            source_order_id: None,
            created_at: Utc::now(),
            created_by: "user-1".into(),
        };
        assert_eq!(movement.on_hand_delta(), 5);

        movement.movement_type = MovementType::Return;
        assert_eq!(movement.on_hand_delta(), 5);

        movement.movement_type = MovementType::Adjust;
        movement.adjust_mode = Some(AdjustMode::Increase);
        assert_eq!(movement.on_hand_delta(), 5);

        movement.adjust_mode = Some(AdjustMode::Decrease);
        assert_eq!(movement.on_hand_delta(), -5);
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "adjust movement without adjust_mode")
    )]
    fn test_adjust_without_mode_is_a_bug() {
        let movement = StockMovement {
            id: "m1".into(),
            store_id: "s1".into(),
            product_id: "p1".into(),
            unit_id: "u1".into(),
            movement_type: MovementType::Adjust,
            qty: 5,
            adjust_mode: None,
            note: None,
            source_order_id: None,
            created_at: Utc::now(),
            created_by: "user-1".into(),
        };
        movement.on_hand_delta();
    }

    #[test]
    fn test_status_transitions() {
        use PurchaseStatus::*;

        assert!(Ordered.can_transition_to(Shipped));
        assert!(Ordered.can_transition_to(Received));
        assert!(Ordered.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Received));
        assert!(Shipped.can_transition_to(Cancelled));

        // Terminal states go nowhere
        for next in [Ordered, Shipped, Received, Cancelled] {
            assert!(!Received.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }

        // No going backwards
        assert!(!Shipped.can_transition_to(Ordered));
        assert!(!Ordered.can_transition_to(Ordered));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PurchaseStatus::Received.is_terminal());
        assert!(PurchaseStatus::Cancelled.is_terminal());
        assert!(!PurchaseStatus::Ordered.is_terminal());
        assert!(!PurchaseStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_enum_wire_format_is_lowercase() {
        // The serde names must match the lowercase strings the database
        // stores and its CHECK constraints enforce
        assert_eq!(
            serde_json::to_string(&MovementType::Adjust).unwrap(),
            "\"adjust\""
        );
        assert_eq!(
            serde_json::to_string(&AdjustMode::Decrease).unwrap(),
            "\"decrease\""
        );
        assert_eq!(
            serde_json::to_string(&PurchaseStatus::Received).unwrap(),
            "\"received\""
        );
        assert_eq!(
            serde_json::to_string(&PurchaseCurrency::Lak).unwrap(),
            "\"lak\""
        );

        let status: PurchaseStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, PurchaseStatus::Cancelled);
    }

    #[test]
    fn test_landed_cost_total() {
        let order = PurchaseOrder {
            id: "o1".into(),
            store_id: "s1".into(),
            supplier_name: None,
            supplier_contact: None,
            purchase_currency: PurchaseCurrency::Thb,
            exchange_rate: 580.0,
            shipping_cost: 1500,
            other_cost: 250,
            other_cost_note: None,
            note: None,
            tracking_info: None,
            expected_at: None,
            status: PurchaseStatus::Ordered,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: "user-1".into(),
            received_at: None,
        };
        assert_eq!(order.landed_cost_total().minor(), 1750);
    }

    #[test]
    fn test_item_line_cost() {
        let item = PurchaseOrderItem {
            id: "i1".into(),
            order_id: "o1".into(),
            product_id: "p1".into(),
            qty_ordered: 50,
            unit_cost_purchase: 1000,
            qty_received: 0,
        };
        assert_eq!(item.line_cost().minor(), 50_000);
    }
}
