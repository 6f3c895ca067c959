//! # Domain Types
//!
//! Core domain types used throughout Bodega.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │ SaleTransaction │   │   LedgerEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (sale-N)    │   │  id (UUID)      │       │
//! │  │  name           │   │  receipt_number │   │  customer_id    │       │
//! │  │  price, cost    │   │  items (JSON)   │   │  kind           │       │
//! │  │  stock ≥ 0      │   │  status         │   │  amount, paid   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │    Counter      │   │   WalletEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id = name      │   │  date (= key)   │       │
//! │  │  name           │   │  current_number │   │  starting_cash  │       │
//! │  │  status         │   │  (monotone)     │   │  ending_cash    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialized Layout
//! External readers (history views, dashboards) consume these types as JSON
//! with camelCase field names and lowercase status strings; the serde
//! attributes below are load-bearing compatibility, not style.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Inventory Item
// =============================================================================

/// An item held in inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on receipts and pick lists.
    pub name: String,

    /// Selling price per unit, in centavos.
    pub price: Money,

    /// Acquisition cost per unit (for margin reports).
    pub cost: Money,

    /// Current stock level. Never negative; every decrement is validated
    /// against this value inside the same transaction.
    pub stock: i64,

    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// One line of a sale or credit, as requested by the caller.
///
/// `item_id` absent means "not in inventory yet": committing the transaction
/// creates the item on the fly. The line total is always recomputed from
/// `unit_price × quantity` during resolution; a caller-supplied total is
/// never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// A resolved line of a committed sale or credit.
///
/// Stored as part of the owning document. After resolution every line
/// carries an `item_id` (freshly generated for new items); the field stays
/// optional because historical documents may reference items that have since
/// been administratively deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// Line total (`unit_price × quantity`), frozen at commit time.
    pub total: Money,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Transitions `active → voided` exactly once; there is no re-activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Sale is committed and counted.
    Active,
    /// Sale was voided; its stock effects have been reversed.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Active
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A committed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransaction {
    /// Derived from the receipt counter: `sale-000042`.
    pub id: String,
    pub items: Vec<LineItem>,
    /// Counter value zero-padded to six digits: `000042`.
    pub receipt_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub total: Money,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_at: Option<DateTime<Utc>>,
}

impl SaleTransaction {
    /// Checks whether the sale still counts towards totals.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SaleStatus::Active
    }
}

// =============================================================================
// Customer
// =============================================================================

/// The status of a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    /// Soft-deleted. Only reachable through a zero-balance deletion.
    Deleted,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Active
    }
}

/// A customer who can carry credit (utang) on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// The kind of a ledger entry: a debt taken or a payment made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Goods taken on credit; increases the customer's balance.
    Credit,
    /// Money received; allocated against open credits oldest-first.
    Payment,
}

/// The status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Deleted,
}

impl Default for EntryStatus {
    fn default() -> Self {
        EntryStatus::Active
    }
}

/// One signed movement on a customer's credit ledger.
///
/// Credits carry `items` (when goods were taken) and a running `paid_amount`
/// that FIFO allocation tops up. Payments carry `paid_credit_ids` when the
/// caller allocated them explicitly. Neither side uses the other's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub customer_id: String,
    /// Serialized as `type` for external readers.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Always non-negative; `kind` carries the sign.
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    /// Credit only: portion already covered by payments. Never exceeds
    /// `amount`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Money>,
    /// Payment only: credits this payment was explicitly allocated to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_credit_ids: Option<Vec<String>>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Checks whether the entry still counts towards the balance.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    /// The unpaid portion of a credit. Zero for payments and for fully
    /// paid credits.
    pub fn remaining(&self) -> Money {
        match self.kind {
            EntryKind::Credit => self
                .amount
                .saturating_sub(self.paid_amount.unwrap_or_default()),
            EntryKind::Payment => Money::zero(),
        }
    }
}

// =============================================================================
// Counter
// =============================================================================

/// A named monotone counter.
///
/// `current_number` only ever increases, even across voids: a voided sale
/// keeps its receipt number and the gap is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    /// Counter name, e.g. `saleReceipt`.
    pub id: String,
    pub current_number: i64,
}

// =============================================================================
// Wallet Entry
// =============================================================================

/// The status of a daily cash session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Open,
    Closed,
}

impl Default for WalletStatus {
    fn default() -> Self {
        WalletStatus::Open
    }
}

/// One day's cash drawer session.
///
/// The calendar date is the entry's key, so at most one session can exist
/// per day. Transitions `open → closed` once, recording the counted cash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WalletEntry {
    pub date: NaiveDate,
    pub starting_cash: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_cash: Option<Money>,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl WalletEntry {
    /// The entry's key: the date in `YYYY-MM-DD` form.
    #[inline]
    pub fn id(&self) -> String {
        self.date.to_string()
    }

    /// Checks whether the session is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == WalletStatus::Open
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
