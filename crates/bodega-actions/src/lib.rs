//! # bodega-actions: Operation Boundary
//!
//! The typed async surface UI event handlers call. One function per
//! operation, every return value an envelope.
//!
//! ## Module Organization
//! ```text
//! src/
//! ├── lib.rs        ◄─── You are here (exports)
//! ├── error.rs      ◄─── Storage errors flattened to envelope messages
//! ├── sales.rs      ◄─── Checkout, void, history, daily summary
//! ├── ledger.rs     ◄─── Credits, payments, corrections
//! ├── customers.rs  ◄─── Suki management
//! ├── wallet.rs     ◄─── Daily cash sessions
//! └── inventory.rs  ◄─── Shelf administration
//! ```
//!
//! ## How Actions Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Action Call Flow                                     │
//! │                                                                         │
//! │  UI event handler                                                       │
//! │  ────────────────                                                       │
//! │  let response = commit_sale(&store, &drafts, Some("Aling Nena")).await; │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  pub async fn commit_sale(                                              │
//! │      store: &Store,                ◄── Shared connection pool           │
//! │      drafts: &[LineItemDraft],     ◄── Typed inputs, no wire format     │
//! │      customer_name: Option<&str>,                                       │
//! │  ) -> CommitSaleResponse           ◄── Envelope, never Err              │
//! │         │                                                               │
//! │         │ (serde to camelCase JSON when a frontend wants it)            │
//! │         ▼                                                               │
//! │  { "success": true, "receiptNumber": "000042", "sale": { … } }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The One Rule
//! No action returns `Err` and no action panics. A rejected business rule
//! or a failed database call still comes back as `{success: false, message}`
//! with a human-readable reason, and the store is left exactly as it was.

pub mod customers;
mod error;
pub mod inventory;
pub mod ledger;
pub mod sales;
pub mod wallet;

pub use customers::{
    add_customer, delete_customer, list_customers, AddCustomerResponse, DeleteCustomerResponse,
    ListCustomersResponse,
};
pub use inventory::{
    add_item, adjust_stock, delete_item, list_items, update_item, AdjustStockResponse,
    DeleteItemResponse, ItemResponse, ListItemsResponse,
};
pub use ledger::{
    commit_credit, commit_payment, customer_ledger, delete_ledger_entry, CommitCreditResponse,
    CommitPaymentResponse, CustomerLedgerResponse, DeleteEntryResponse,
};
pub use sales::{
    commit_sale, daily_summary, recent_sales, void_sale, CommitSaleResponse, DailySummaryResponse,
    RecentSalesResponse, VoidSaleResponse,
};
pub use wallet::{
    close_day, start_day, wallet_history, wallet_status, CloseDayResponse, StartDayResponse,
    WalletHistoryResponse, WalletStatusResponse,
};
