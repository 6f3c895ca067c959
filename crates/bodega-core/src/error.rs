//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bodega-db errors (separate crate)                                     │
//! │  └── StoreError       - Database operation failures                    │
//! │                                                                         │
//! │  bodega-actions (boundary)                                             │
//! │  └── {success: false, message} envelope - what callers see             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → envelope → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, balance, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations inside the transactional
/// operations. They are caught at the actions boundary and translated into
/// the `{success: false, message}` envelope.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced inventory item does not exist.
    ///
    /// ## When This Occurs
    /// - A sale or credit line item names an id with no inventory row
    /// - The item was hard-deleted administratively before the commit
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: String },

    /// Not enough stock to cover the requested quantity.
    ///
    /// Reservation is all-or-nothing: when any line fails this check, no
    /// stock is decremented at all.
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// Sale transaction not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// The sale was already voided; voiding is not idempotent.
    ///
    /// The second void attempt is a hard error so that stock is never
    /// restored twice.
    #[error("Sale {0} is already voided")]
    AlreadyVoided(String),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(String),

    /// The ledger entry was already soft-deleted.
    #[error("Ledger entry {0} is already deleted")]
    AlreadyDeleted(String),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Customer exists but was soft-deleted.
    #[error("Customer {0} is deleted")]
    CustomerDeleted(String),

    /// A customer with outstanding credit cannot be deleted.
    ///
    /// ## When This Occurs
    /// - `delete_customer` while any active credit still has
    ///   `amount - paidAmount > 0`
    #[error("Customer has an outstanding balance of {balance}")]
    OutstandingBalance { balance: Money },

    /// No wallet entry exists for the date.
    #[error("No wallet entry for {0}")]
    WalletNotFound(String),

    /// A wallet entry for the date is already open.
    #[error("A wallet session for {0} is already open")]
    WalletAlreadyOpen(String),

    /// The wallet entry for the date was already closed.
    #[error("The wallet session for {0} is already closed")]
    WalletAlreadyClosed(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
