//! # Sale Repository
//!
//! Committing and voiding sales, plus the read surface for history views.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                commit_sale (one transaction)                    │
//! │                                                                 │
//! │  drafts ──► resolve_line_items (pure)                           │
//! │               │ items, new_items, decrements, total             │
//! │               ▼                                                 │
//! │  reserve_stock(decrements)    ── all-or-nothing stock check     │
//! │  create_items(new_items)      ── on-the-fly items, stock 100    │
//! │  next_number('saleReceipt')   ── 42                             │
//! │               │                                                 │
//! │               ▼                                                 │
//! │  INSERT sales: id 'sale-000042', receipt '000042',              │
//! │                items JSON, total, status 'active'               │
//! │               │                                                 │
//! │               ▼                                                 │
//! │  COMMIT  ── or any failure above rolls ALL of it back:          │
//! │            stock, new items, counter, sale row                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Voiding restores stock exactly once; a second void is a hard error
//! - A voided sale keeps its receipt number (gaps from voids are fine)
//! - Line items are stored as a JSON snapshot inside the sale row; later
//!   price or item changes never rewrite history

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use bodega_core::resolve::resolve_line_items;
use bodega_core::validation::{validate_customer_name, validate_line_items};
use bodega_core::{
    CoreError, LineItem, LineItemDraft, Money, SaleStatus, SaleTransaction, SALE_RECEIPT_COUNTER,
};

use crate::error::StoreResult;
use crate::repository::counter::{format_receipt, next_number};
use crate::repository::inventory::{create_items, generate_item_id, release_stock, reserve_stock};
use crate::repository::with_busy_retry;

/// One day's sales, aggregated for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesSummary {
    pub date: NaiveDate,
    /// Number of active sales on the date. Voided sales don't count.
    pub count: i64,
    /// Sum of active sale totals.
    pub total: Money,
}

/// Repository for sale transactions.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new sale repository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Coordinators
    // =========================================================================

    /// Commits a sale: reserves stock, creates on-the-fly items, allocates
    /// the receipt number, and inserts the sale, all in one transaction.
    ///
    /// ## Arguments
    /// * `drafts` - Requested line items; duplicates of the same item are
    ///   summed before the stock check
    /// * `customer_name` - Optional walk-in name printed on the receipt
    ///
    /// ## Returns
    /// The committed sale, receipt number already formatted.
    pub async fn commit_sale(
        &self,
        drafts: &[LineItemDraft],
        customer_name: Option<&str>,
    ) -> StoreResult<SaleTransaction> {
        validate_line_items(drafts).map_err(CoreError::from)?;
        if let Some(name) = customer_name {
            validate_customer_name(name).map_err(CoreError::from)?;
        }

        with_busy_retry(|| self.try_commit_sale(drafts, customer_name)).await
    }

    async fn try_commit_sale(
        &self,
        drafts: &[LineItemDraft],
        customer_name: Option<&str>,
    ) -> StoreResult<SaleTransaction> {
        let mut tx = self.pool.begin().await?;

        let resolution = resolve_line_items(drafts, generate_item_id);

        reserve_stock(&mut tx, &resolution.decrements).await?;
        create_items(&mut tx, &resolution.new_items).await?;

        let number = next_number(&mut tx, SALE_RECEIPT_COUNTER).await?;
        let receipt_number = format_receipt(number);

        let sale = SaleTransaction {
            id: format!("sale-{receipt_number}"),
            items: resolution.items,
            receipt_number,
            customer_name: customer_name.map(|name| name.trim().to_string()),
            total: resolution.total,
            status: SaleStatus::Active,
            created_at: Utc::now(),
            voided_at: None,
        };

        let items_json = serde_json::to_string(&sale.items)?;

        sqlx::query(
            "INSERT INTO sales
                 (id, receipt_number, customer_name, items, total, status, created_at, voided_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(&sale.customer_name)
        .bind(&items_json)
        .bind(sale.total)
        .bind(sale.status)
        .bind(sale.created_at)
        .bind(sale.voided_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total = sale.total.cents(),
            "Sale committed"
        );

        Ok(sale)
    }

    /// Voids a sale, restoring stock for every line that still resolves to
    /// an inventory item.
    ///
    /// ## Errors
    /// * `SaleNotFound` - No sale with this id
    /// * `AlreadyVoided` - The sale was voided before; stock is never
    ///   restored twice
    pub async fn void_sale(&self, id: &str) -> StoreResult<SaleTransaction> {
        with_busy_retry(|| self.try_void_sale(id)).await
    }

    async fn try_void_sale(&self, id: &str) -> StoreResult<SaleTransaction> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, receipt_number, customer_name, items, total, status, created_at, voided_at
             FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut sale = match row {
            Some(row) => sale_from_row(&row)?,
            None => return Err(CoreError::SaleNotFound(id.to_string()).into()),
        };

        if sale.status == SaleStatus::Voided {
            return Err(CoreError::AlreadyVoided(id.to_string()).into());
        }

        let increments: Vec<(String, i64)> = sale
            .items
            .iter()
            .filter_map(|line| line.item_id.clone().map(|item_id| (item_id, line.quantity)))
            .collect();
        release_stock(&mut tx, &increments).await?;

        let voided_at = Utc::now();

        // Status guard: only an active sale flips, even if another writer
        // slipped in between the read above and this update.
        let result = sqlx::query(
            "UPDATE sales SET status = 'voided', voided_at = ?2
             WHERE id = ?1 AND status = 'active'",
        )
        .bind(id)
        .bind(voided_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::AlreadyVoided(id.to_string()).into());
        }

        tx.commit().await?;

        sale.status = SaleStatus::Voided;
        sale.voided_at = Some(voided_at);

        debug!(sale_id = %id, "Sale voided, stock released");

        Ok(sale)
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Gets a sale by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<SaleTransaction>> {
        let row = sqlx::query(
            "SELECT id, receipt_number, customer_name, items, total, status, created_at, voided_at
             FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sale_from_row).transpose()
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> StoreResult<Vec<SaleTransaction>> {
        let rows = sqlx::query(
            "SELECT id, receipt_number, customer_name, items, total, status, created_at, voided_at
             FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sale_from_row).collect()
    }

    /// Count and total of active sales on a calendar date.
    pub async fn sales_summary(&self, date: NaiveDate) -> StoreResult<DailySalesSummary> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let (count, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total), 0) FROM sales
             WHERE status = 'active' AND created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailySalesSummary {
            date,
            count,
            total: Money::from_cents(total),
        })
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Maps a sales row, decoding the line-item JSON snapshot.
fn sale_from_row(row: &SqliteRow) -> StoreResult<SaleTransaction> {
    let items_json: String = row.try_get("items")?;
    let items: Vec<LineItem> = serde_json::from_str(&items_json)?;

    Ok(SaleTransaction {
        id: row.try_get("id")?,
        items,
        receipt_number: row.try_get("receipt_number")?,
        customer_name: row.try_get("customer_name")?,
        total: row.try_get("total")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        voided_at: row.try_get("voided_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Store, StoreConfig};
    use bodega_core::{InventoryItem, DEFAULT_NEW_ITEM_STOCK};

    async fn setup_test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
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

    fn draft_new(name: &str, price: i64, quantity: i64) -> LineItemDraft {
        LineItemDraft {
            item_id: None,
            item_name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(price),
        }
    }

    #[tokio::test]
    async fn test_commit_sale_reserves_stock_and_numbers_receipt() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let sale = store
            .sales()
            .commit_sale(&[draft_for(&item, 2)], Some("Aling Nena"))
            .await
            .unwrap();

        assert_eq!(sale.id, "sale-000001");
        assert_eq!(sale.receipt_number, "000001");
        assert_eq!(sale.customer_name.as_deref(), Some("Aling Nena"));
        assert_eq!(sale.total, Money::from_cents(5000));
        assert_eq!(sale.status, SaleStatus::Active);
        assert_eq!(sale.items[0].total, Money::from_cents(5000));

        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 8);
    }

    #[tokio::test]
    async fn test_commit_sale_rejects_empty_items() {
        let store = setup_test_store().await;

        let result = store.sales().commit_sale(&[], None).await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_insufficient_stock_aborts_whole_commit() {
        let store = setup_test_store().await;
        let plenty = seed_item(&store, "Sardinas", 2500, 10).await;
        let scarce = seed_item(&store, "Asin", 1200, 1).await;

        let result = store
            .sales()
            .commit_sale(&[draft_for(&plenty, 5), draft_for(&scarce, 5)], None)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            }))
        ));

        // Nothing happened: no stock moved, no receipt consumed, no sale row.
        assert_eq!(store.inventory().get(&plenty.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.inventory().get(&scarce.id).await.unwrap().unwrap().stock, 1);
        assert_eq!(store.counters().current(SALE_RECEIPT_COUNTER).await.unwrap(), 0);
        assert!(store.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_lines_sum_before_stock_check() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Suka", 1800, 5).await;

        let result = store
            .sales()
            .commit_sale(&[draft_for(&item, 3), draft_for(&item, 4)], None)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::InsufficientStock {
                available: 5,
                requested: 7,
                ..
            }))
        ));

        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_duplicate_lines_within_stock_both_apply() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Suka", 1800, 7).await;

        let sale = store
            .sales()
            .commit_sale(&[draft_for(&item, 3), draft_for(&item, 4)], None)
            .await
            .unwrap();

        assert_eq!(sale.items.len(), 2);
        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_new_item_line_creates_item_without_decrement() {
        let store = setup_test_store().await;

        let sale = store
            .sales()
            .commit_sale(&[draft_new("Tinapay", 500, 3)], None)
            .await
            .unwrap();

        let new_item_id = sale.items[0].item_id.clone().unwrap();
        let item = store.inventory().get(&new_item_id).await.unwrap().unwrap();

        assert_eq!(item.name, "Tinapay");
        assert_eq!(item.price, Money::from_cents(500));
        // Created at the default level, NOT decremented by this sale.
        assert_eq!(item.stock, DEFAULT_NEW_ITEM_STOCK);
        assert_eq!(sale.total, Money::from_cents(1500));
    }

    #[tokio::test]
    async fn test_receipt_numbers_strictly_increase() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 100).await;

        let mut receipts = Vec::new();
        for _ in 0..3 {
            let sale = store
                .sales()
                .commit_sale(&[draft_for(&item, 1)], None)
                .await
                .unwrap();
            receipts.push(sale.receipt_number);
        }

        assert_eq!(receipts, vec!["000001", "000002", "000003"]);
    }

    #[tokio::test]
    async fn test_concurrent_commits_get_distinct_gapless_receipts() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 100).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let sales = store.sales();
            let draft = draft_for(&item, 1);
            handles.push(tokio::spawn(async move {
                sales
                    .commit_sale(&[draft], None)
                    .await
                    .unwrap()
                    .receipt_number
            }));
        }

        let mut receipts = Vec::new();
        for handle in handles {
            receipts.push(handle.await.unwrap());
        }

        receipts.sort();
        let expected: Vec<String> = (1..=8).map(|n| format!("{n:06}")).collect();
        assert_eq!(receipts, expected);

        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 92);
    }

    #[tokio::test]
    async fn test_void_restores_stock_exactly_once() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let sale = store
            .sales()
            .commit_sale(&[draft_for(&item, 2)], None)
            .await
            .unwrap();
        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 8);

        let voided = store.sales().void_sale(&sale.id).await.unwrap();
        assert_eq!(voided.status, SaleStatus::Voided);
        assert!(voided.voided_at.is_some());
        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 10);

        // Second void hard-fails and does not touch stock again.
        let again = store.sales().void_sale(&sale.id).await;
        assert!(matches!(
            again,
            Err(StoreError::Domain(CoreError::AlreadyVoided(_)))
        ));
        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_void_missing_sale() {
        let store = setup_test_store().await;

        let result = store.sales().void_sale("sale-999999").await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::SaleNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_void_skips_items_deleted_since_the_sale() {
        let store = setup_test_store().await;
        let kept = seed_item(&store, "Sardinas", 2500, 10).await;
        let doomed = seed_item(&store, "Asin", 1200, 10).await;

        let sale = store
            .sales()
            .commit_sale(&[draft_for(&kept, 1), draft_for(&doomed, 1)], None)
            .await
            .unwrap();

        store.inventory().delete(&doomed.id).await.unwrap();

        store.sales().void_sale(&sale.id).await.unwrap();

        // The surviving item got its unit back; the vanished one is skipped.
        assert_eq!(store.inventory().get(&kept.id).await.unwrap().unwrap().stock, 10);
        assert!(store.inventory().get(&doomed.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_round_trips_line_items() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let committed = store
            .sales()
            .commit_sale(&[draft_for(&item, 3)], None)
            .await
            .unwrap();

        let fetched = store.sales().get(&committed.id).await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].item_id.as_deref(), Some(item.id.as_str()));
        assert_eq!(fetched.items[0].quantity, 3);
        assert_eq!(fetched.items[0].total, Money::from_cents(7500));
        assert_eq!(fetched.total, Money::from_cents(7500));
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 100).await;

        for _ in 0..3 {
            store
                .sales()
                .commit_sale(&[draft_for(&item, 1)], None)
                .await
                .unwrap();
        }

        let recent = store.sales().list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].receipt_number, "000003");
        assert_eq!(recent[1].receipt_number, "000002");
    }

    #[tokio::test]
    async fn test_sales_summary_counts_only_active() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 100).await;

        store
            .sales()
            .commit_sale(&[draft_for(&item, 2)], None)
            .await
            .unwrap();
        let doomed = store
            .sales()
            .commit_sale(&[draft_for(&item, 1)], None)
            .await
            .unwrap();
        store.sales().void_sale(&doomed.id).await.unwrap();

        let summary = store
            .sales()
            .sales_summary(Utc::now().date_naive())
            .await
            .unwrap();

        assert_eq!(summary.count, 1);
        assert_eq!(summary.total, Money::from_cents(5000));
    }

    #[tokio::test]
    async fn test_customer_name_is_trimmed() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let sale = store
            .sales()
            .commit_sale(&[draft_for(&item, 1)], Some("  Mang Tomas  "))
            .await
            .unwrap();

        assert_eq!(sale.customer_name.as_deref(), Some("Mang Tomas"));
    }
}
