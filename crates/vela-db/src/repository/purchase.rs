//! # Purchase Order Repository
//!
//! Order lifecycle and fulfillment: the only producer of purchase-sourced
//! IN movements in the whole system.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Purchase Order Lifecycle                             │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → PurchaseOrder { status: Ordered }                    │
//! │         (or, with receive_immediately, straight to Received with       │
//! │          the full receiving side effects in the same transaction)      │
//! │                                                                         │
//! │  2. SHIP                                                                │
//! │     └── update_status(Shipped, tracking_info)                           │
//! │                                                                         │
//! │  3. RECEIVE (terminal)                                                  │
//! │     └── update_status(Received, received_items?)                        │
//! │         ├── guarded status UPDATE  ← the idempotency barrier           │
//! │         ├── set qty_received per item (clamped to [0, qty_ordered])    │
//! │         └── one IN movement per item with qty_received > 0             │
//! │         All of it in ONE transaction: a Received order always has      │
//! │         its postings, and postings never exist without the status.     │
//! │                                                                         │
//! │  4. CANCEL (terminal, from Ordered/Shipped only)                        │
//! │     └── update_status(Cancelled) - no postings, no reversals           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Double-Receive Guard
//! The status flip is `UPDATE .. WHERE id = ? AND status IN ('ordered',
//! 'shipped')`. A retried receive matches zero rows, the state machine
//! reports `InvalidTransition`, and the transaction rolls back before any
//! posting. Movements therefore post exactly once per order.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::stock::{apply_on_hand_delta, insert_movement};
use vela_core::validation::{
    validate_purchase_order_input, validate_tracking_info, validate_uuid,
};
use vela_core::{
    CoreError, MovementType, PurchaseOrder, PurchaseOrderInput, PurchaseOrderItem, PurchaseStatus,
    ReceivedItem, StatusUpdate, StockMovement, StoreContext,
};

/// Unit recorded on movements posted by receiving. Purchase order lines
/// are always expressed in the product's base unit.
const BASE_UNIT_ID: &str = "base";

/// A purchase order together with its line items.
#[derive(Debug, Clone)]
pub struct PurchaseOrderWithItems {
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// Repository for purchase order operations.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    /// Creates a new PurchaseOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// Creates a purchase order.
    ///
    /// With `receive_immediately` the order is written already Received and
    /// the receiving side effects (qty_received, IN movements, balances)
    /// run in the same transaction, exactly as a later RECEIVED transition
    /// would.
    pub async fn create(
        &self,
        ctx: &StoreContext,
        input: PurchaseOrderInput,
    ) -> DbResult<PurchaseOrderWithItems> {
        validate_purchase_order_input(&input)?;

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let receive_immediately = input.receive_immediately;

        let order = PurchaseOrder {
            id: order_id.clone(),
            store_id: ctx.store_id.clone(),
            supplier_name: input.supplier_name,
            supplier_contact: input.supplier_contact,
            purchase_currency: input.purchase_currency,
            exchange_rate: input.exchange_rate,
            shipping_cost: input.shipping_cost,
            other_cost: input.other_cost,
            other_cost_note: input.other_cost_note,
            note: input.note,
            tracking_info: None,
            expected_at: input.expected_at,
            status: PurchaseStatus::Ordered,
            created_at: now,
            updated_at: now,
            created_by: ctx.user_id.clone(),
            received_at: None,
        };

        let items: Vec<PurchaseOrderItem> = input
            .items
            .into_iter()
            .map(|item| PurchaseOrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: item.product_id,
                qty_ordered: item.qty_ordered,
                unit_cost_purchase: item.unit_cost_purchase,
                qty_received: 0,
            })
            .collect();

        debug!(
            order_id = %order.id,
            store_id = %order.store_id,
            items = items.len(),
            receive_immediately,
            "Creating purchase order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, store_id, supplier_name, supplier_contact,
                purchase_currency, exchange_rate, shipping_cost, other_cost,
                other_cost_note, note, tracking_info, expected_at, status,
                created_at, updated_at, created_by, received_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&order.id)
        .bind(&order.store_id)
        .bind(&order.supplier_name)
        .bind(&order.supplier_contact)
        .bind(order.purchase_currency)
        .bind(order.exchange_rate)
        .bind(order.shipping_cost)
        .bind(order.other_cost)
        .bind(&order.other_cost_note)
        .bind(&order.note)
        .bind(&order.tracking_info)
        .bind(order.expected_at)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(&order.created_by)
        .bind(order.received_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_items (
                    id, order_id, product_id, qty_ordered, unit_cost_purchase, qty_received
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.qty_ordered)
            .bind(item.unit_cost_purchase)
            .bind(item.qty_received)
            .execute(&mut *tx)
            .await?;
        }

        if receive_immediately {
            // Same side effects as a later RECEIVED transition, same tx.
            // flip_status cannot fail here (the row was just written as
            // Ordered inside this transaction), so the guard is for shape,
            // not for a race.
            flip_status(&mut tx, &order.id, PurchaseStatus::Received).await?;
            receive_items(&mut tx, ctx, &order.id, items.clone(), None).await?;

            tx.commit().await?;

            // Re-read so the caller sees final statuses and quantities
            return self
                .get(&order.id)
                .await?
                .ok_or_else(|| DbError::not_found("PurchaseOrder", &order.id));
        }

        tx.commit().await?;

        info!(order_id = %order.id, "Purchase order created");

        Ok(PurchaseOrderWithItems { order, items })
    }

    /// Transitions a purchase order to a new status.
    ///
    /// ## Semantics by Target
    /// - `Shipped`: records `tracking_info`
    /// - `Received`: sets `qty_received` per item (defaults to the full
    ///   ordered quantity; clamped to `[0, qty_ordered]`) and posts one IN
    ///   movement per item with a positive received quantity, atomically
    ///   with the status flip
    /// - `Cancelled`: status only; nothing is posted or reversed
    ///
    /// Illegal transitions (including any retry against a terminal state)
    /// fail with `InvalidTransition` before any posting.
    pub async fn update_status(
        &self,
        ctx: &StoreContext,
        order_id: &str,
        update: StatusUpdate,
    ) -> DbResult<PurchaseOrderWithItems> {
        validate_uuid("order_id", order_id).map_err(CoreError::from)?;
        validate_tracking_info(update.tracking_info.as_deref()).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        // Read the current status inside the transaction so the legality
        // check and the guarded flip see the same row.
        let current: Option<(PurchaseStatus, String)> = sqlx::query_as(
            r#"SELECT status, store_id FROM purchase_orders WHERE id = ?1"#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (current_status, store_id) = match current {
            Some(row) => row,
            None => return Err(CoreError::OrderNotFound(order_id.to_string()).into()),
        };

        if store_id != ctx.store_id {
            // Orders are store-scoped; another store's id is simply not found
            return Err(CoreError::OrderNotFound(order_id.to_string()).into());
        }

        if !current_status.can_transition_to(update.status) {
            return Err(CoreError::InvalidTransition {
                from: current_status,
                to: update.status,
            }
            .into());
        }

        debug!(
            order_id,
            from = ?current_status,
            to = ?update.status,
            "Updating purchase order status"
        );

        flip_status(&mut tx, order_id, update.status).await?;

        if let Some(tracking) = &update.tracking_info {
            sqlx::query(r#"UPDATE purchase_orders SET tracking_info = ?2 WHERE id = ?1"#)
                .bind(order_id)
                .bind(tracking)
                .execute(&mut *tx)
                .await?;
        }

        if update.status == PurchaseStatus::Received {
            let items = fetch_items(&mut tx, order_id).await?;
            receive_items(&mut tx, ctx, order_id, items, update.received_items).await?;
        }

        tx.commit().await?;

        info!(order_id, status = ?update.status, "Purchase order status updated");

        self.get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseOrder", order_id))
    }

    /// Gets an order with its items.
    pub async fn get(&self, order_id: &str) -> DbResult<Option<PurchaseOrderWithItems>> {
        let order: Option<PurchaseOrder> = sqlx::query_as(
            r#"
            SELECT id, store_id, supplier_name, supplier_contact,
                   purchase_currency, exchange_rate, shipping_cost, other_cost,
                   other_cost_note, note, tracking_info, expected_at, status,
                   created_at, updated_at, created_by, received_at
            FROM purchase_orders
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items: Vec<PurchaseOrderItem> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, qty_ordered, unit_cost_purchase, qty_received
            FROM purchase_order_items
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PurchaseOrderWithItems { order, items }))
    }

    /// Lists a store's orders, newest first, items not loaded.
    pub async fn list(&self, store_id: &str, limit: u32) -> DbResult<Vec<PurchaseOrder>> {
        let orders: Vec<PurchaseOrder> = sqlx::query_as(
            r#"
            SELECT id, store_id, supplier_name, supplier_contact,
                   purchase_currency, exchange_rate, shipping_cost, other_cost,
                   other_cost_note, note, tracking_info, expected_at, status,
                   created_at, updated_at, created_by, received_at
            FROM purchase_orders
            WHERE store_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Transaction Internals
// =============================================================================

/// Guarded status flip: only succeeds from a non-terminal state.
///
/// Zero rows affected means another request got there first (or the caller
/// raced a terminal state); surfacing that as `InvalidTransition` before
/// any posting is what makes receiving idempotent.
async fn flip_status(
    conn: &mut SqliteConnection,
    order_id: &str,
    status: PurchaseStatus,
) -> DbResult<()> {
    let now = Utc::now();
    let received_at = (status == PurchaseStatus::Received).then_some(now);

    let result = sqlx::query(
        r#"
        UPDATE purchase_orders SET
            status = ?2,
            updated_at = ?3,
            received_at = COALESCE(?4, received_at)
        WHERE id = ?1 AND status IN ('ordered', 'shipped')
        "#,
    )
    .bind(order_id)
    .bind(status)
    .bind(now)
    .bind(received_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // The pre-check passed but the row changed under us; report the
        // freshest status we can see.
        let current: Option<(PurchaseStatus,)> =
            sqlx::query_as(r#"SELECT status FROM purchase_orders WHERE id = ?1"#)
                .bind(order_id)
                .fetch_optional(&mut *conn)
                .await?;

        return Err(match current {
            Some((from,)) => CoreError::InvalidTransition { from, to: status }.into(),
            None => CoreError::OrderNotFound(order_id.to_string()).into(),
        });
    }

    Ok(())
}

/// Loads an order's items inside a transaction.
async fn fetch_items(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<Vec<PurchaseOrderItem>> {
    let items: Vec<PurchaseOrderItem> = sqlx::query_as(
        r#"
        SELECT id, order_id, product_id, qty_ordered, unit_cost_purchase, qty_received
        FROM purchase_order_items
        WHERE order_id = ?1
        ORDER BY id
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

/// Applies received quantities and posts the ledger movements.
///
/// Runs strictly after the guarded status flip in the same transaction, so
/// it executes at most once per order. `received` entries override the
/// default full-quantity receipt; quantities clamp to `[0, qty_ordered]`
/// and an entry for an unknown item id fails the whole transaction.
async fn receive_items(
    conn: &mut SqliteConnection,
    ctx: &StoreContext,
    order_id: &str,
    mut items: Vec<PurchaseOrderItem>,
    received: Option<Vec<ReceivedItem>>,
) -> DbResult<()> {
    if let Some(received) = received {
        for entry in received {
            let item = items
                .iter_mut()
                .find(|item| item.id == entry.item_id)
                .ok_or_else(|| CoreError::ItemNotFound {
                    order_id: order_id.to_string(),
                    item_id: entry.item_id.clone(),
                })?;
            item.qty_received = entry.qty_received.clamp(0, item.qty_ordered);
        }
    } else {
        // Receiving without explicit quantities means everything arrived
        for item in items.iter_mut() {
            item.qty_received = item.qty_ordered;
        }
    }

    let now = Utc::now();

    for item in &items {
        sqlx::query(r#"UPDATE purchase_order_items SET qty_received = ?2 WHERE id = ?1"#)
            .bind(&item.id)
            .bind(item.qty_received)
            .execute(&mut *conn)
            .await?;

        if item.qty_received == 0 {
            continue;
        }

        // Exactly one IN movement per received line
        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            store_id: ctx.store_id.clone(),
            product_id: item.product_id.clone(),
            unit_id: BASE_UNIT_ID.to_string(),
            movement_type: MovementType::In,
            qty: item.qty_received,
            adjust_mode: None,
            note: None,
            source_order_id: Some(order_id.to_string()),
            created_at: now,
            created_by: ctx.user_id.clone(),
        };

        insert_movement(&mut *conn, &movement).await?;
        apply_on_hand_delta(&mut *conn, &ctx.store_id, &item.product_id, item.qty_received, now)
            .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
