//! # bodega-core: Pure Business Logic for Bodega
//!
//! This crate is the **heart** of Bodega. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Callers (UI handlers, seed tool)             │   │
//! │  │    commit_sale, void_sale, commit_payment, start_day, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                bodega-actions (Operation Boundary)              │   │
//! │  │    validation, {success, message} envelopes, tracing            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bodega-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  resolve  │  │  allocate │  │   │
//! │  │   │ Inventory │  │   Money   │  │ line item │  │ FIFO pay  │  │   │
//! │  │   │  Ledger   │  │ centavos  │  │resolution │  │ alloc.    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bodega-db (Storage Layer)                    │   │
//! │  │         SQLite transactions, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, SaleTransaction, LedgerEntry, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`resolve`] - Line item resolution shared by sales and credits
//! - [`allocate`] - FIFO payment allocation and balance computation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::allocate::{allocate_fifo, OpenCredit};
//! use bodega_core::money::Money;
//!
//! // Two open credits, oldest first
//! let credits = vec![
//!     OpenCredit {
//!         id: "c1".to_string(),
//!         amount: Money::from_cents(10000),
//!         paid_amount: Money::zero(),
//!     },
//!     OpenCredit {
//!         id: "c2".to_string(),
//!         amount: Money::from_cents(5000),
//!         paid_amount: Money::zero(),
//!     },
//! ];
//!
//! // A payment of ₱120.00 fills the oldest credit first
//! let allocation = allocate_fifo(&credits, Money::from_cents(12000));
//! assert_eq!(allocation.payoffs[0].new_paid_amount.cents(), 10000);
//! assert_eq!(allocation.payoffs[1].new_paid_amount.cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocate;
pub mod error;
pub mod money;
pub mod resolve;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bodega_core::Money` instead of
// `use bodega_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// The counter that numbers sale receipts.
///
/// ## Why a constant?
/// There is exactly one receipt sequence per store. Keeping the name in one
/// place lets the sale coordinator and the seed tool agree on it.
pub const SALE_RECEIPT_COUNTER: &str = "saleReceipt";

/// Width of a formatted receipt number (`000042`).
pub const RECEIPT_NUMBER_WIDTH: usize = 6;

/// Maximum line items allowed in a single sale or credit
///
/// ## Business Reason
/// Prevents runaway submissions and ensures reasonable transaction sizes.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Stock level given to an inventory item created on the fly by a sale.
///
/// A new item was clearly in the shop when it was sold, so it starts with a
/// plausible shelf quantity rather than zero. The creating sale does not
/// decrement it.
pub const DEFAULT_NEW_ITEM_STOCK: i64 = 100;
