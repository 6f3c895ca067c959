//! # Ledger Actions
//!
//! The utang notebook surface: credits, payments, and corrections.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Record Payment Flow                                  │
//! │                                                                         │
//! │  "Si Aling Nena, magbabayad ng ₱120"                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit_payment(store, customer_id, ₱120, credit_ids)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One SQLite transaction:                                                │
//! │    read open credits → walk oldest first → raise paidAmount             │
//! │    → insert the payment entry                                           │
//! │       │                                                                 │
//! │       ├── ok ──► {success: true, entry, allocated, leftover}            │
//! │       │                                                                 │
//! │       └── any failure ──► {success: false, message}                     │
//! │                           (no credit touched, no entry written)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bodega_core::{LedgerEntry, LineItemDraft, Money};
use bodega_db::{Store, StoreError};

use crate::error::failure_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitCreditResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<LedgerEntry>,
    /// How much of the payment landed on open credits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated: Option<Money>,
    /// The part of the payment no open credit absorbed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leftover: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLedgerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Money>,
    /// Raw Σ amount over active credits (history column, not the balance).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_total: Option<Money>,
    /// Raw Σ amount over active payments (history column, not the balance).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_total: Option<Money>,
    pub entries: Vec<LedgerEntry>,
}

impl CustomerLedgerResponse {
    fn failed(err: StoreError) -> Self {
        CustomerLedgerResponse {
            success: false,
            message: Some(failure_message(err)),
            balance: None,
            credit_total: None,
            payment_total: None,
            entries: Vec::new(),
        }
    }
}

/// Records a credit (utang): the customer takes goods now, pays later.
///
/// Stock is reserved exactly as a sale would, but no receipt number is
/// consumed.
///
/// ## Arguments
/// * `customer_id` - Must name an active customer
/// * `drafts` - The goods taken on credit
/// * `description` - Free-text note for the notebook
pub async fn commit_credit(
    store: &Store,
    customer_id: &str,
    drafts: &[LineItemDraft],
    description: Option<&str>,
) -> CommitCreditResponse {
    debug!(customer_id = %customer_id, lines = drafts.len(), "commit_credit action");

    match store.ledger().commit_credit(customer_id, drafts, description).await {
        Ok(entry) => {
            info!(entry_id = %entry.id, customer_id = %customer_id, amount = %entry.amount, "Credit recorded");
            CommitCreditResponse {
                success: true,
                message: None,
                entry: Some(entry),
            }
        }
        Err(err) => CommitCreditResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
        },
    }
}

/// Records a payment and spreads it across the customer's open credits.
///
/// ## Arguments
/// * `amount` - Must be positive
/// * `credit_ids` - `None` pays oldest-first across every open credit;
///   `Some(ids)` restricts the same oldest-first walk to those credits
///
/// ## Returns
/// The payment entry plus how the amount split into `allocated` and
/// `leftover`.
pub async fn commit_payment(
    store: &Store,
    customer_id: &str,
    amount: Money,
    credit_ids: Option<&[String]>,
) -> CommitPaymentResponse {
    debug!(customer_id = %customer_id, amount = %amount, "commit_payment action");

    match store.ledger().commit_payment(customer_id, amount, credit_ids).await {
        Ok(outcome) => {
            info!(
                entry_id = %outcome.entry.id,
                customer_id = %customer_id,
                allocated = %outcome.allocated,
                leftover = %outcome.leftover,
                "Payment recorded"
            );
            CommitPaymentResponse {
                success: true,
                message: None,
                entry: Some(outcome.entry),
                allocated: Some(outcome.allocated),
                leftover: Some(outcome.leftover),
            }
        }
        Err(err) => CommitPaymentResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
            allocated: None,
            leftover: None,
        },
    }
}

/// Soft-deletes a ledger entry.
///
/// Deleting a credit returns its goods to the shelf; deleting a payment
/// leaves the paid amounts it produced in place.
pub async fn delete_ledger_entry(store: &Store, entry_id: &str) -> DeleteEntryResponse {
    debug!(entry_id = %entry_id, "delete_ledger_entry action");

    match store.ledger().delete_entry(entry_id).await {
        Ok(entry) => {
            info!(entry_id = %entry.id, "Ledger entry deleted");
            DeleteEntryResponse {
                success: true,
                message: None,
                entry: Some(entry),
            }
        }
        Err(err) => DeleteEntryResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
        },
    }
}

/// Reads one customer's page of the notebook: active entries oldest first,
/// the outstanding balance, and the raw credit/payment history totals.
pub async fn customer_ledger(store: &Store, customer_id: &str) -> CustomerLedgerResponse {
    debug!(customer_id = %customer_id, "customer_ledger action");

    let entries = match store.ledger().entries_for_customer(customer_id).await {
        Ok(entries) => entries,
        Err(err) => return CustomerLedgerResponse::failed(err),
    };

    let balance = match store.ledger().outstanding_balance(customer_id).await {
        Ok(balance) => balance,
        Err(err) => return CustomerLedgerResponse::failed(err),
    };

    match store.ledger().customer_totals(customer_id).await {
        Ok(totals) => CustomerLedgerResponse {
            success: true,
            message: None,
            balance: Some(balance),
            credit_total: Some(totals.credit_total),
            payment_total: Some(totals.payment_total),
            entries,
        },
        Err(err) => CustomerLedgerResponse::failed(err),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::{Customer, EntryKind, InventoryItem};
    use bodega_db::StoreConfig;

    async fn setup_test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(store: &Store, name: &str) -> Customer {
        store
            .customers()
            .add_customer(name, Money::zero(), None)
            .await
            .unwrap()
    }

    async fn seed_item(store: &Store, name: &str, price: i64, stock: i64) -> InventoryItem {
        store
            .inventory()
            .create(name, Money::from_cents(price), Money::zero(), stock)
            .await
            .unwrap()
    }

    fn draft_for(item: &InventoryItem, quantity: i64) -> LineItemDraft {
        LineItemDraft {
            item_id: Some(item.id.clone()),
            item_name: item.name.clone(),
            quantity,
            unit_price: item.price,
        }
    }

    #[tokio::test]
    async fn test_commit_credit_reserves_stock_and_returns_the_entry() {
        let store = setup_test_store().await;
        let customer = seed_customer(&store, "Mang Tomas").await;
        let item = seed_item(&store, "Mantika", 9500, 6).await;

        let response = commit_credit(
            &store,
            &customer.id,
            &[draft_for(&item, 2)],
            Some("listahan"),
        )
        .await;

        assert!(response.success);
        let entry = response.entry.unwrap();
        assert_eq!(entry.kind, EntryKind::Credit);
        assert_eq!(entry.amount, Money::from_cents(19000));

        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 4);
    }

    #[tokio::test]
    async fn test_commit_credit_for_unknown_customer_fails_clean() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Asin", 1500, 10).await;

        let response = commit_credit(&store, "ghost", &[draft_for(&item, 1)], None).await;

        assert!(!response.success);
        assert_eq!(response.message.unwrap(), "Customer not found: ghost");

        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);
    }

    #[tokio::test]
    async fn test_commit_payment_reports_the_split() {
        let store = setup_test_store().await;
        let customer = seed_customer(&store, "Ka Eddie").await;
        let item = seed_item(&store, "Bigas", 5200, 20).await;

        commit_credit(&store, &customer.id, &[draft_for(&item, 1)], None).await;

        let response =
            commit_payment(&store, &customer.id, Money::from_cents(6000), None).await;

        assert!(response.success);
        assert_eq!(response.allocated, Some(Money::from_cents(5200)));
        assert_eq!(response.leftover, Some(Money::from_cents(800)));
        assert_eq!(
            response.entry.unwrap().amount,
            Money::from_cents(6000)
        );

        let page = customer_ledger(&store, &customer.id).await;
        assert_eq!(page.balance, Some(Money::zero()));
    }

    #[tokio::test]
    async fn test_commit_payment_with_unknown_credit_id_writes_nothing() {
        let store = setup_test_store().await;
        let customer = seed_customer(&store, "Boy Balut").await;
        let item = seed_item(&store, "Tubig", 1500, 10).await;

        commit_credit(&store, &customer.id, &[draft_for(&item, 2)], None).await;

        let picked = vec!["nope".to_string()];
        let response =
            commit_payment(&store, &customer.id, Money::from_cents(1000), Some(&picked)).await;

        assert!(!response.success);
        assert_eq!(response.message.unwrap(), "Ledger entry not found: nope");

        let page = customer_ledger(&store, &customer.id).await;
        assert_eq!(page.balance, Some(Money::from_cents(3000)));
        assert_eq!(page.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_credit_returns_goods_then_refuses_again() {
        let store = setup_test_store().await;
        let customer = seed_customer(&store, "Tindera Luz").await;
        let item = seed_item(&store, "Chicharon", 2000, 10).await;

        let credit = commit_credit(&store, &customer.id, &[draft_for(&item, 3)], None)
            .await
            .entry
            .unwrap();

        let first = delete_ledger_entry(&store, &credit.id).await;
        assert!(first.success);
        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);

        let second = delete_ledger_entry(&store, &credit.id).await;
        assert!(!second.success);
        assert_eq!(
            second.message.unwrap(),
            format!("Ledger entry {} is already deleted", credit.id)
        );
    }

    #[tokio::test]
    async fn test_customer_ledger_reads_the_notebook_page() {
        let store = setup_test_store().await;
        let customer = seed_customer(&store, "Aling Nena").await;
        let item = seed_item(&store, "Kape", 800, 100).await;

        commit_credit(&store, &customer.id, &[draft_for(&item, 5)], None).await;
        commit_payment(&store, &customer.id, Money::from_cents(1000), None).await;

        let page = customer_ledger(&store, &customer.id).await;

        assert!(page.success);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].kind, EntryKind::Credit);
        assert_eq!(page.entries[1].kind, EntryKind::Payment);
        assert_eq!(page.balance, Some(Money::from_cents(3000)));
        assert_eq!(page.credit_total, Some(Money::from_cents(4000)));
        assert_eq!(page.payment_total, Some(Money::from_cents(1000)));
    }
}
