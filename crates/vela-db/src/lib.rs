//! # vela-db: Database Layer for Vela POS
//!
//! This crate provides durable storage for the inventory ledger, purchase
//! orders and per-store sequence counters. It uses SQLite with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Data Flow                               │
//! │                                                                         │
//! │  Request handler (already authorized, carries StoreContext)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  stock ledger  │    │  (embedded)  │  │   │
//! │  │   │               │    │  purchase ord. │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  sequences     │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (WAL)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Many request handlers share one pool. Correctness comes from the
//! storage transaction boundary, not in-process coordination:
//!
//! - every multi-step write (apply movement, receive order) is one sqlx
//!   transaction whose first statement is a write, so SQLite's single
//!   writer serializes the critical section
//! - sequence allocation is a single atomic upsert statement
//! - a busy/locked database surfaces as [`DbError::Conflict`] for the
//!   caller to retry; nothing is retried in here
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_db::{Database, DbConfig};
//! use vela_core::StoreContext;
//!
//! let db = Database::new(DbConfig::new("path/to/vela.db")).await?;
//! let ctx = StoreContext::new("store-1", "user-1");
//!
//! let balance = db.stock().get_balance("store-1", "prod-1").await?;
//! let barcode = db.sequences().next_barcode("store-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::purchase::{PurchaseOrderRepository, PurchaseOrderWithItems};
pub use repository::sequence::SequenceAllocator;
pub use repository::stock::StockLedger;
