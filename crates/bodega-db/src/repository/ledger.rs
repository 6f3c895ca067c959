//! # Ledger Repository
//!
//! The customer credit ledger: credits taken, payments applied oldest-first,
//! and compensating soft deletes.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              commit_payment (one transaction)                   │
//! │                                                                 │
//! │  load active credits, oldest first      ₱100   ₱50   ₱200      │
//! │       │                                 paid 0 paid 0 paid 0    │
//! │       ▼                                                         │
//! │  allocate ₱120 (pure, FIFO)                                     │
//! │       │        ┌──────────┬──────────┬─────────┐                │
//! │       ▼        ▼          ▼          ▼         ▼                │
//! │            ₱100 paid   ₱20 paid   untouched  leftover ₱0        │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  UPDATE each paidAmount, INSERT payment entry, COMMIT           │
//! │                                                                 │
//! │  The credit read happens INSIDE the transaction: a concurrent   │
//! │  payment cannot double-apply against the same open amounts.     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - `paidAmount` never exceeds `amount`; the allocator caps every top-up
//! - Deleting a credit releases the stock its items reserved, but does NOT
//!   un-apply payments already allocated to it
//! - Deleting a payment does NOT restore `paidAmount` on the credits it
//!   paid; both stay as recorded
//! - Balance is always Σ (amount − paidAmount) over active credits, never
//!   a stored running total

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use bodega_core::allocate::{allocate_fifo, allocate_to_credits, OpenCredit};
use bodega_core::resolve::resolve_line_items;
use bodega_core::validation::{validate_amount, validate_description, validate_line_items};
use bodega_core::{
    CoreError, EntryKind, EntryStatus, LedgerEntry, LineItem, LineItemDraft, Money,
};

use crate::error::StoreResult;
use crate::repository::customer::require_active_customer;
use crate::repository::inventory::{create_items, generate_item_id, release_stock, reserve_stock};
use crate::repository::with_busy_retry;

/// What a committed payment did.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The recorded payment entry.
    pub entry: LedgerEntry,
    /// Portion of the payment that was applied to open credits.
    pub allocated: Money,
    /// Unapplied remainder (overpayment, or nothing left to pay).
    pub leftover: Money,
}

/// Signed-sum reporting figures for one customer's notebook page.
///
/// These are raw sums over active entries. They are NOT the balance:
/// `creditTotal − paymentTotal` matches the outstanding balance only while
/// no payment has ever overshot the open credits. The history screen shows
/// both columns; the balance is always the per-credit paid-amount view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTotals {
    /// Σ amount over active credits.
    pub credit_total: Money,
    /// Σ amount over active payments, including any unallocated leftover.
    pub payment_total: Money,
}

/// Repository for ledger entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Coordinators
    // =========================================================================

    /// Records goods taken on credit (utang).
    ///
    /// Shares the sale pipeline: line items are resolved, stock is reserved
    /// all-or-nothing, on-the-fly items are created. Unlike a sale, the
    /// entry consumes no receipt number.
    pub async fn commit_credit(
        &self,
        customer_id: &str,
        drafts: &[LineItemDraft],
        description: Option<&str>,
    ) -> StoreResult<LedgerEntry> {
        validate_line_items(drafts).map_err(CoreError::from)?;
        validate_description(description).map_err(CoreError::from)?;

        with_busy_retry(|| self.try_commit_credit(customer_id, drafts, description)).await
    }

    async fn try_commit_credit(
        &self,
        customer_id: &str,
        drafts: &[LineItemDraft],
        description: Option<&str>,
    ) -> StoreResult<LedgerEntry> {
        let mut tx = self.pool.begin().await?;

        require_active_customer(&mut tx, customer_id).await?;

        let resolution = resolve_line_items(drafts, generate_item_id);
        reserve_stock(&mut tx, &resolution.decrements).await?;
        create_items(&mut tx, &resolution.new_items).await?;

        let entry = LedgerEntry {
            id: generate_entry_id(),
            customer_id: customer_id.to_string(),
            kind: EntryKind::Credit,
            amount: resolution.total,
            description: description.map(|text| text.trim().to_string()),
            items: Some(resolution.items),
            paid_amount: Some(Money::zero()),
            paid_credit_ids: None,
            status: EntryStatus::Active,
            created_at: Utc::now(),
            deleted_at: None,
        };
        insert_entry(&mut tx, &entry).await?;

        tx.commit().await?;

        debug!(
            entry_id = %entry.id,
            customer_id = %customer_id,
            amount = entry.amount.cents(),
            "Credit recorded"
        );

        Ok(entry)
    }

    /// Records a payment and applies it to the customer's open credits.
    ///
    /// With `selected` absent the payment walks ALL open credits oldest
    /// first. With `selected` present the same walk is restricted to the
    /// chosen credits, still capped by `amount`; the entry then records
    /// which credits it actually paid.
    ///
    /// Money that finds no open credit is kept as `leftover` on the
    /// outcome; the payment entry itself always records the full tendered
    /// amount.
    pub async fn commit_payment(
        &self,
        customer_id: &str,
        amount: Money,
        selected: Option<&[String]>,
    ) -> StoreResult<PaymentOutcome> {
        validate_amount(amount).map_err(CoreError::from)?;

        with_busy_retry(|| self.try_commit_payment(customer_id, amount, selected)).await
    }

    async fn try_commit_payment(
        &self,
        customer_id: &str,
        amount: Money,
        selected: Option<&[String]>,
    ) -> StoreResult<PaymentOutcome> {
        let mut tx = self.pool.begin().await?;

        require_active_customer(&mut tx, customer_id).await?;

        let credits = open_credits(&mut tx, customer_id).await?;
        let allocation = match selected {
            Some(ids) => allocate_to_credits(&credits, ids, amount)?,
            None => allocate_fifo(&credits, amount),
        };

        for payoff in &allocation.payoffs {
            sqlx::query("UPDATE ledger_entries SET paid_amount = ?2 WHERE id = ?1")
                .bind(&payoff.credit_id)
                .bind(payoff.new_paid_amount)
                .execute(&mut *tx)
                .await?;
        }

        let entry = LedgerEntry {
            id: generate_entry_id(),
            customer_id: customer_id.to_string(),
            kind: EntryKind::Payment,
            amount,
            description: None,
            items: None,
            paid_amount: None,
            paid_credit_ids: selected.map(|_| allocation.paid_credit_ids()),
            status: EntryStatus::Active,
            created_at: Utc::now(),
            deleted_at: None,
        };
        insert_entry(&mut tx, &entry).await?;

        tx.commit().await?;

        debug!(
            entry_id = %entry.id,
            customer_id = %customer_id,
            amount = amount.cents(),
            allocated = allocation.allocated.cents(),
            leftover = allocation.leftover.cents(),
            "Payment recorded"
        );

        Ok(PaymentOutcome {
            entry,
            allocated: allocation.allocated,
            leftover: allocation.leftover,
        })
    }

    /// Soft-deletes a ledger entry.
    ///
    /// A credit that carried items releases their stock (items deleted in
    /// the meantime are skipped). Nothing else is compensated; see the
    /// module rules.
    ///
    /// ## Errors
    /// * `EntryNotFound` - No entry with this id
    /// * `AlreadyDeleted` - The entry was deleted before; stock is never
    ///   released twice
    pub async fn delete_entry(&self, id: &str) -> StoreResult<LedgerEntry> {
        with_busy_retry(|| self.try_delete_entry(id)).await
    }

    async fn try_delete_entry(&self, id: &str) -> StoreResult<LedgerEntry> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, customer_id, kind, amount, description, items, paid_amount,
                    paid_credit_ids, status, created_at, deleted_at
             FROM ledger_entries WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut entry = match row {
            Some(row) => entry_from_row(&row)?,
            None => return Err(CoreError::EntryNotFound(id.to_string()).into()),
        };

        if entry.status == EntryStatus::Deleted {
            return Err(CoreError::AlreadyDeleted(id.to_string()).into());
        }

        if entry.kind == EntryKind::Credit {
            if let Some(items) = &entry.items {
                let increments: Vec<(String, i64)> = items
                    .iter()
                    .filter_map(|line| line.item_id.clone().map(|item_id| (item_id, line.quantity)))
                    .collect();
                release_stock(&mut tx, &increments).await?;
            }
        }

        let deleted_at = Utc::now();

        let result = sqlx::query(
            "UPDATE ledger_entries SET status = 'deleted', deleted_at = ?2
             WHERE id = ?1 AND status = 'active'",
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::AlreadyDeleted(id.to_string()).into());
        }

        tx.commit().await?;

        entry.status = EntryStatus::Deleted;
        entry.deleted_at = Some(deleted_at);

        debug!(entry_id = %id, "Ledger entry deleted");

        Ok(entry)
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Gets a ledger entry by id, deleted or not.
    pub async fn get(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        let row = sqlx::query(
            "SELECT id, customer_id, kind, amount, description, items, paid_amount,
                    paid_credit_ids, status, created_at, deleted_at
             FROM ledger_entries WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    /// Lists a customer's active entries, oldest first, both kinds mixed
    /// the way the ledger page shows them.
    pub async fn entries_for_customer(&self, customer_id: &str) -> StoreResult<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            "SELECT id, customer_id, kind, amount, description, items, paid_amount,
                    paid_credit_ids, status, created_at, deleted_at
             FROM ledger_entries
             WHERE customer_id = ?1 AND status = 'active'
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// The customer's outstanding balance: Σ (amount − paidAmount) over
    /// active credits. Payments participate only through the paid amounts
    /// they already wrote, so the sum can never go below zero.
    pub async fn outstanding_balance(&self, customer_id: &str) -> StoreResult<Money> {
        let balance: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount - COALESCE(paid_amount, 0)), 0)
             FROM ledger_entries
             WHERE customer_id = ?1 AND kind = 'credit' AND status = 'active'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(balance))
    }

    /// Raw credit and payment sums for the history columns.
    pub async fn customer_totals(&self, customer_id: &str) -> StoreResult<CustomerTotals> {
        let (credit_total, payment_total): (Money, Money) = sqlx::query_as(
            "SELECT
                 COALESCE(SUM(CASE WHEN kind = 'credit' THEN amount ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN kind = 'payment' THEN amount ELSE 0 END), 0)
             FROM ledger_entries
             WHERE customer_id = ?1 AND status = 'active'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerTotals {
            credit_total,
            payment_total,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Inserts a ledger entry on the caller's transaction.
pub(crate) async fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry,
) -> StoreResult<()> {
    let items_json = entry
        .items
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let paid_ids_json = entry
        .paid_credit_ids
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        "INSERT INTO ledger_entries
             (id, customer_id, kind, amount, description, items, paid_amount,
              paid_credit_ids, status, created_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&entry.id)
    .bind(&entry.customer_id)
    .bind(entry.kind)
    .bind(entry.amount)
    .bind(&entry.description)
    .bind(&items_json)
    .bind(entry.paid_amount)
    .bind(&paid_ids_json)
    .bind(entry.status)
    .bind(entry.created_at)
    .bind(entry.deleted_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Loads a customer's active credits as allocator input, oldest first, on
/// the caller's transaction. Fully paid credits are included; the allocator
/// skips them.
pub(crate) async fn open_credits(
    conn: &mut SqliteConnection,
    customer_id: &str,
) -> StoreResult<Vec<OpenCredit>> {
    let rows: Vec<(String, Money, Option<Money>)> = sqlx::query_as(
        "SELECT id, amount, paid_amount FROM ledger_entries
         WHERE customer_id = ?1 AND kind = 'credit' AND status = 'active'
         ORDER BY created_at ASC, rowid ASC",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, amount, paid_amount)| OpenCredit {
            id,
            amount,
            paid_amount: paid_amount.unwrap_or_default(),
        })
        .collect())
}

/// Generates a new unique ledger entry ID.
pub fn generate_entry_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Maps a ledger_entries row, decoding the JSON columns.
fn entry_from_row(row: &SqliteRow) -> StoreResult<LedgerEntry> {
    let items = match row.try_get::<Option<String>, _>("items")? {
        Some(json) => Some(serde_json::from_str::<Vec<LineItem>>(&json)?),
        None => None,
    };
    let paid_credit_ids = match row.try_get::<Option<String>, _>("paid_credit_ids")? {
        Some(json) => Some(serde_json::from_str::<Vec<String>>(&json)?),
        None => None,
    };

    Ok(LedgerEntry {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        kind: row.try_get("kind")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        items,
        paid_amount: row.try_get("paid_amount")?,
        paid_credit_ids,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
