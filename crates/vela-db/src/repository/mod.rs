//! # Repository Module
//!
//! Database repository implementations for Vela POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request handler                                                        │
//! │       │                                                                 │
//! │       │  db.stock().apply_movement(&ctx, input)                         │
//! │       ▼                                                                 │
//! │  StockLedger / PurchaseOrderRepository / SequenceAllocator              │
//! │       │                                                                 │
//! │       │  SQL inside one transaction per operation                       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                         │
//! │  • The transaction boundary is visible in exactly one function          │
//! │  • Domain rules stay in vela-core; repositories just enforce them       │
//! │    at the storage boundary                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`stock::StockLedger`] - append-only movements + balance projection
//! - [`purchase::PurchaseOrderRepository`] - order lifecycle and receiving
//! - [`sequence::SequenceAllocator`] - atomic per-store counters, barcodes

pub mod purchase;
pub mod sequence;
pub mod stock;
