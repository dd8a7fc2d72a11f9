//! # vela-core: Pure Business Logic for Vela POS
//!
//! This crate is the **heart** of the Vela POS inventory platform. It holds
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport / Presentation (out of scope)              │   │
//! │  │   Auth middleware resolves (store_id, user_id) + permission     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ explicit StoreContext                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ vela-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │  barcode  │  │   │
//! │  │   │ Movement  │  │   Money   │  │ VAT math  │  │  EAN-13   │  │   │
//! │  │   │  POrder   │  │ rounding  │  │ clamping  │  │ check dig │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vela-db (Database Layer)                     │   │
//! │  │        Stock ledger, purchase orders, sequence counters         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockMovement, PurchaseOrder, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Order totals calculator (discount, VAT, shipping)
//! - [`barcode`] - EAN-13 check digits for internal barcodes
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in the smallest currency unit (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Explicit Context**: Every operation receives the acting store and user;
//!    the core never reads ambient session state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::Money` instead of
// `use vela_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use totals::{compute_order_totals, OrderTotals, OrderTotalsInput, VatMode};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for free-text notes on movements, tracking info and
/// other-cost notes.
pub const MAX_NOTE_LEN: usize = 240;

/// Maximum length for a purchase order's own note field.
pub const MAX_ORDER_NOTE_LEN: usize = 500;

/// Maximum length for supplier name / contact fields.
pub const MAX_SUPPLIER_FIELD_LEN: usize = 100;

/// VAT rates are basis points; 10000 bps = 100%.
pub const MAX_VAT_RATE_BPS: u32 = 10_000;

/// Reserved prefix for internally allocated EAN-13 barcodes.
///
/// GS1 reserves the `20`-`29` range for in-store numbering, so codes
/// allocated here can never collide with supplier-issued barcodes.
pub const INTERNAL_BARCODE_PREFIX: &str = "20";
