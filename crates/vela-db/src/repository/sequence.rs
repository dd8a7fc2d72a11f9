//! # Sequence Allocator
//!
//! Per-store named counters, used mainly to mint internal EAN-13 barcodes
//! for products that arrive without one.
//!
//! ## Atomicity
//! Allocation is one statement:
//! ```text
//! INSERT .. VALUES (store, kind, 1)
//!   ON CONFLICT(store_id, kind) DO UPDATE SET value = value + 1
//!   RETURNING value
//! ```
//! The upsert and the read happen under the same writer lock, so two
//! concurrent allocations can never observe the same value. No
//! read-then-write window exists for them to race through.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vela_core::barcode;

/// Counter kind used for internal barcode numbering.
pub const BARCODE_SEQUENCE: &str = "barcode";

/// Repository for per-store monotonic sequences.
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    pool: SqlitePool,
}

impl SequenceAllocator {
    /// Creates a new SequenceAllocator.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceAllocator { pool }
    }

    /// Allocates the next value of a named sequence, starting at 1.
    ///
    /// Values are unique and strictly increasing per `(store_id, kind)`.
    /// Gaps can appear if a caller allocates and then abandons the value;
    /// that is acceptable, reuse is not.
    pub async fn next_in_sequence(&self, store_id: &str, kind: &str) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO store_sequences (store_id, kind, value)
            VALUES (?1, ?2, 1)
            ON CONFLICT(store_id, kind) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
        )
        .bind(store_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        debug!(store_id, kind, value, "Allocated sequence value");

        Ok(value)
    }

    /// Allocates the next internal EAN-13 barcode for a store.
    ///
    /// The code carries the "20" in-store prefix, a 10-digit zero-padded
    /// sequence number and a valid check digit.
    pub async fn next_barcode(&self, store_id: &str) -> DbResult<String> {
        let sequence = self.next_in_sequence(store_id, BARCODE_SEQUENCE).await?;

        barcode::internal_barcode(sequence).ok_or_else(|| {
            DbError::Internal(format!(
                "barcode sequence exhausted for store {store_id}: {sequence}"
            ))
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::collections::HashSet;
    use vela_core::barcode::is_valid_ean13;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_sequence_starts_at_one() {
        let db = test_db().await;
        let first = db.sequences().next_in_sequence("store-1", "barcode").await.unwrap();
        assert_eq!(first, 1);
    }

    #[tokio::test]
    async fn test_sequence_strictly_increases() {
        let db = test_db().await;
        let mut previous = 0;
        for _ in 0..25 {
            let value = db.sequences().next_in_sequence("store-1", "barcode").await.unwrap();
            assert!(value > previous);
            previous = value;
        }
        assert_eq!(previous, 25);
    }

    #[tokio::test]
    async fn test_sequences_are_independent_per_store_and_kind() {
        let db = test_db().await;
        let sequences = db.sequences();

        assert_eq!(sequences.next_in_sequence("store-1", "barcode").await.unwrap(), 1);
        assert_eq!(sequences.next_in_sequence("store-1", "barcode").await.unwrap(), 2);

        // A different store starts from scratch
        assert_eq!(sequences.next_in_sequence("store-2", "barcode").await.unwrap(), 1);
        // So does a different kind within the same store
        assert_eq!(sequences.next_in_sequence("store-1", "receipt").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_first_barcode() {
        let db = test_db().await;
        let code = db.sequences().next_barcode("store-1").await.unwrap();

        assert_eq!(code.len(), 13);
        assert!(code.starts_with("20"));
        assert!(is_valid_ean13(&code));
        // Prefix "20" + sequence 1 zero-padded to ten digits
        assert!(code.starts_with("200000000001"));
    }

    #[tokio::test]
    async fn test_barcodes_are_distinct_and_valid() {
        let db = test_db().await;
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let code = db.sequences().next_barcode("store-1").await.unwrap();
            assert!(is_valid_ean13(&code), "invalid barcode {code}");
            assert!(seen.insert(code), "duplicate barcode allocated");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_are_distinct() {
        // The in-memory config is a single connection, which would serialize
        // everything by itself; racing allocators needs a file-backed pool
        let path = std::env::temp_dir().join(format!("vela-seq-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..40 {
            let sequences = db.sequences();
            handles.push(tokio::spawn(async move {
                sequences.next_barcode("store-1").await.unwrap()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let code = handle.await.unwrap();
            assert!(is_valid_ean13(&code), "invalid barcode {code}");
            assert!(seen.insert(code), "duplicate barcode under concurrency");
        }
        assert_eq!(seen.len(), 40);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(path.with_extension(format!("db{suffix}")));
        }
    }
}
