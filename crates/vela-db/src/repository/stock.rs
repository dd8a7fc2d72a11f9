//! # Stock Ledger
//!
//! Append-only movement log plus the derived balance projection.
//!
//! ## Ledger Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       How a Movement Posts                              │
//! │                                                                         │
//! │  apply_movement(ctx, input)                                             │
//! │       │                                                                 │
//! │       ├── validate (qty > 0, adjust mode present, note length)          │
//! │       │        rejected here = nothing written                          │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │       ├── INSERT stock_movements  ← first statement is a write, so     │
//! │       │                             this takes SQLite's writer lock    │
//! │       ├── read current balance (inside the same tx)                    │
//! │       ├── reject if a decrease would go below zero                     │
//! │       └── UPSERT stock_balances (available = on_hand - reserved)       │
//! │  COMMIT (or roll back wholesale)                                        │
//! │                                                                         │
//! │  Movements are never edited or rolled back after commit; corrections   │
//! │  are compensating movements.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vela_core::validation::validate_movement_input;
use vela_core::{CoreError, MovementInput, StockBalance, StockMovement, StoreContext};

/// Repository owning the movement log and balance projection.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Appends a movement and updates the balance projection atomically.
    ///
    /// ## Failure Semantics
    /// - malformed input fails validation before any state change
    /// - a decrease below zero on-hand fails `InsufficientStock` and the
    ///   transaction rolls back, movement included
    /// - once committed, the movement is immutable
    pub async fn apply_movement(
        &self,
        ctx: &StoreContext,
        input: MovementInput,
    ) -> DbResult<StockMovement> {
        validate_movement_input(&input)?;

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            store_id: ctx.store_id.clone(),
            product_id: input.product_id,
            unit_id: input.unit_id,
            movement_type: input.movement_type,
            qty: input.qty,
            adjust_mode: input.adjust_mode,
            note: input.note,
            source_order_id: None,
            created_at: Utc::now(),
            created_by: ctx.user_id.clone(),
        };

        debug!(
            store_id = %movement.store_id,
            product_id = %movement.product_id,
            movement_type = ?movement.movement_type,
            qty = movement.qty,
            "Applying stock movement"
        );

        let mut tx = self.pool.begin().await?;

        insert_movement(&mut tx, &movement).await?;
        apply_on_hand_delta(
            &mut tx,
            &movement.store_id,
            &movement.product_id,
            movement.on_hand_delta(),
            movement.created_at,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Gets the balance for a (store, product) pair.
    ///
    /// Defaults to all-zero when no movement exists yet; the projection row
    /// is only created by the first movement.
    pub async fn get_balance(&self, store_id: &str, product_id: &str) -> DbResult<StockBalance> {
        let balance: Option<StockBalance> = sqlx::query_as(
            r#"
            SELECT store_id, product_id, on_hand, reserved, available, updated_at
            FROM stock_balances
            WHERE store_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance.unwrap_or_else(|| StockBalance::empty(store_id, product_id)))
    }

    /// Lists products whose on-hand is at or below the given threshold,
    /// ordered by ascending on-hand (emptiest first).
    pub async fn list_low_stock(
        &self,
        store_id: &str,
        threshold: i64,
    ) -> DbResult<Vec<StockBalance>> {
        let balances: Vec<StockBalance> = sqlx::query_as(
            r#"
            SELECT store_id, product_id, on_hand, reserved, available, updated_at
            FROM stock_balances
            WHERE store_id = ?1 AND on_hand <= ?2
            ORDER BY on_hand ASC, product_id ASC
            "#,
        )
        .bind(store_id)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    /// Audit trail for one product, newest first.
    pub async fn list_movements(
        &self,
        store_id: &str,
        product_id: &str,
        limit: u32,
    ) -> DbResult<Vec<StockMovement>> {
        let movements: Vec<StockMovement> = sqlx::query_as(
            r#"
            SELECT id, store_id, product_id, unit_id, movement_type, qty,
                   adjust_mode, note, source_order_id, created_at, created_by
            FROM stock_movements
            WHERE store_id = ?1 AND product_id = ?2
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Shared Posting Primitives
// =============================================================================
// The purchase order repository posts IN movements through these same
// functions, inside its own receiving transaction.

/// Inserts one immutable movement row.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, store_id, product_id, unit_id, movement_type, qty,
            adjust_mode, note, source_order_id, created_at, created_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.store_id)
    .bind(&movement.product_id)
    .bind(&movement.unit_id)
    .bind(movement.movement_type)
    .bind(movement.qty)
    .bind(movement.adjust_mode)
    .bind(&movement.note)
    .bind(&movement.source_order_id)
    .bind(movement.created_at)
    .bind(&movement.created_by)
    .execute(conn)
    .await?;

    Ok(())
}

/// Applies a signed delta to a balance row, creating it on first touch.
///
/// Must run inside a transaction that already holds the writer lock (i.e.
/// after at least one write statement); the read-then-write here is safe
/// only under that serialization.
pub(crate) async fn apply_on_hand_delta(
    conn: &mut SqliteConnection,
    store_id: &str,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<StockBalance> {
    let current: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT on_hand, reserved FROM stock_balances
        WHERE store_id = ?1 AND product_id = ?2
        "#,
    )
    .bind(store_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (on_hand, reserved) = current.unwrap_or((0, 0));
    let new_on_hand = on_hand + delta;

    if new_on_hand < 0 {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            on_hand,
            requested: -delta,
        }
        .into());
    }

    let available = new_on_hand - reserved;

    sqlx::query(
        r#"
        INSERT INTO stock_balances (store_id, product_id, on_hand, reserved, available, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (store_id, product_id) DO UPDATE SET
            on_hand = excluded.on_hand,
            available = excluded.available,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(store_id)
    .bind(product_id)
    .bind(new_on_hand)
    .bind(reserved)
    .bind(available)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(StockBalance {
        store_id: store_id.to_string(),
        product_id: product_id.to_string(),
        on_hand: new_on_hand,
        reserved,
        available,
        updated_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vela_core::{AdjustMode, MovementType};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ctx() -> StoreContext {
        StoreContext::new("store-1", "user-1")
    }

    fn movement(movement_type: MovementType, qty: i64, mode: Option<AdjustMode>) -> MovementInput {
        MovementInput {
            product_id: "prod-1".into(),
            unit_id: "unit-pc".into(),
            movement_type,
            qty,
            adjust_mode: mode,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_in_movement_increases_on_hand() {
        let db = test_db().await;
        let ledger = db.stock();

        ledger
            .apply_movement(&ctx(), movement(MovementType::In, 10, None))
            .await
            .unwrap();

        let balance = ledger.get_balance("store-1", "prod-1").await.unwrap();
        assert_eq!(balance.on_hand, 10);
        assert_eq!(balance.reserved, 0);
        assert_eq!(balance.available, 10);
    }

    #[tokio::test]
    async fn test_balance_invariant_across_movement_sequence() {
        let db = test_db().await;
        let ledger = db.stock();

        let steps = [
            movement(MovementType::In, 10, None),
            movement(MovementType::Return, 3, None),
            movement(MovementType::Adjust, 4, Some(AdjustMode::Decrease)),
            movement(MovementType::Adjust, 2, Some(AdjustMode::Increase)),
        ];

        for step in steps {
            ledger.apply_movement(&ctx(), step).await.unwrap();
            let b = ledger.get_balance("store-1", "prod-1").await.unwrap();
            assert_eq!(b.available, b.on_hand - b.reserved);
        }

        let balance = ledger.get_balance("store-1", "prod-1").await.unwrap();
        assert_eq!(balance.on_hand, 11); // 10 + 3 - 4 + 2
    }

    #[tokio::test]
    async fn test_decrease_below_zero_is_rejected() {
        let db = test_db().await;
        let ledger = db.stock();

        ledger
            .apply_movement(&ctx(), movement(MovementType::In, 5, None))
            .await
            .unwrap();

        let err = ledger
            .apply_movement(
                &ctx(),
                movement(MovementType::Adjust, 6, Some(AdjustMode::Decrease)),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Core(CoreError::InsufficientStock { on_hand: 5, .. })
        ));

        // Rejection left nothing behind: balance unchanged, no movement row
        let balance = ledger.get_balance("store-1", "prod-1").await.unwrap();
        assert_eq!(balance.on_hand, 5);
        let movements = ledger.list_movements("store-1", "prod-1", 10).await.unwrap();
        assert_eq!(movements.len(), 1);
    }

    #[tokio::test]
    async fn test_decrease_to_exactly_zero_is_allowed() {
        let db = test_db().await;
        let ledger = db.stock();

        ledger
            .apply_movement(&ctx(), movement(MovementType::In, 5, None))
            .await
            .unwrap();
        ledger
            .apply_movement(
                &ctx(),
                movement(MovementType::Adjust, 5, Some(AdjustMode::Decrease)),
            )
            .await
            .unwrap();

        let balance = ledger.get_balance("store-1", "prod-1").await.unwrap();
        assert_eq!(balance.on_hand, 0);
        assert_eq!(balance.available, 0);
    }

    #[tokio::test]
    async fn test_validation_rejects_before_any_write() {
        let db = test_db().await;
        let ledger = db.stock();

        // qty must be positive
        let err = ledger
            .apply_movement(&ctx(), movement(MovementType::In, 0, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Core(CoreError::InvalidQuantity { qty: 0 })
        ));

        // adjust needs a mode
        let err = ledger
            .apply_movement(&ctx(), movement(MovementType::Adjust, 5, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Core(CoreError::MissingAdjustMode)
        ));

        let movements = ledger.list_movements("store-1", "prod-1", 10).await.unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pair_defaults_to_zero_balance() {
        let db = test_db().await;
        let balance = db
            .stock()
            .get_balance("store-1", "never-moved")
            .await
            .unwrap();
        assert_eq!(balance.on_hand, 0);
        assert_eq!(balance.reserved, 0);
        assert_eq!(balance.available, 0);
    }

    #[tokio::test]
    async fn test_low_stock_ordering() {
        let db = test_db().await;
        let ledger = db.stock();

        for (product, qty) in [("prod-a", 8), ("prod-b", 2), ("prod-c", 50)] {
            let mut input = movement(MovementType::In, qty, None);
            input.product_id = product.into();
            ledger.apply_movement(&ctx(), input).await.unwrap();
        }

        let low = ledger.list_low_stock("store-1", 10).await.unwrap();
        let products: Vec<&str> = low.iter().map(|b| b.product_id.as_str()).collect();
        assert_eq!(products, vec!["prod-b", "prod-a"]);
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let db = test_db().await;
        let ledger = db.stock();

        ledger
            .apply_movement(&ctx(), movement(MovementType::In, 9, None))
            .await
            .unwrap();

        let other = ledger.get_balance("store-2", "prod-1").await.unwrap();
        assert_eq!(other.on_hand, 0);
    }
}
