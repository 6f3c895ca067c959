//! # Bodega Database Layer
//!
//! SQLite-backed persistence for the bodega transaction engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           bodega-db                                     │
//! │                                                                         │
//! │  ┌──────────┐    ┌──────────────────────────────────────────────┐      │
//! │  │  Store   │───►│              Repositories                    │      │
//! │  │  (pool)  │    │                                              │      │
//! │  └──────────┘    │  inventory  ── stock levels, admin CRUD      │      │
//! │       │          │  counters   ── receipt numbering             │      │
//! │       │          │  sales      ── commit / void coordinators    │      │
//! │       ▼          │  customers  ── balance-gated lifecycle       │      │
//! │  ┌──────────┐    │  ledger     ── credits, FIFO payments        │      │
//! │  │migrations│    │  wallet     ── daily cash sessions           │      │
//! │  └──────────┘    └──────────────────────────────────────────────┘      │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                     ┌──────────────────────────┐                        │
//! │                     │  SQLite (WAL mode)       │                        │
//! │                     │  - inventory_items       │                        │
//! │                     │  - counters              │                        │
//! │                     │  - sales                 │                        │
//! │                     │  - customers             │                        │
//! │                     │  - ledger_entries        │                        │
//! │                     │  - wallet_entries        │                        │
//! │                     └──────────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **Repository pattern**: One repository per aggregate, cheap to clone
//! 2. **Transactional writes**: Multi-table operations commit or roll back
//!    as a unit; no partial state is ever visible
//! 3. **Domain logic stays in bodega-core**: Repositories load state, call
//!    pure functions, persist results
//! 4. **Busy retry**: SQLite write contention is retried, then surfaced as
//!    [`StoreError::TransactionAborted`]
//!
//! ## Usage
//! ```rust,ignore
//! use bodega_db::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("./bodega.db")).await?;
//!
//! let sale = store
//!     .sales()
//!     .commit_sale(&drafts, Some("Aling Nena"))
//!     .await?;
//! println!("Receipt #{}", sale.receipt_number);
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-export main types for convenience
pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};
pub use repository::counter::CounterRepository;
pub use repository::customer::{CustomerRepository, CustomerWithBalance};
pub use repository::inventory::InventoryRepository;
pub use repository::ledger::{CustomerTotals, LedgerRepository, PaymentOutcome};
pub use repository::sale::{DailySalesSummary, SaleRepository};
pub use repository::wallet::WalletRepository;

// Re-export core types so consumers don't need a direct bodega-core dep
pub use bodega_core::{
    Counter, CoreError, Customer, CustomerStatus, EntryKind, EntryStatus, InventoryItem,
    LedgerEntry, LineItem, LineItemDraft, Money, SaleStatus, SaleTransaction, ValidationError,
    WalletEntry, WalletStatus,
};
