//! # Inventory Repository
//!
//! Stock levels and the reservation protocol.
//!
//! ## Reservation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              reserve_stock (on the caller's tx)                 │
//! │                                                                 │
//! │  decrements: {"I1": 7, "I2": 2}   (already summed per item)     │
//! │                                                                 │
//! │  Read phase ── every item, before any write:                    │
//! │    I1: stock 5  < 7  ──► InsufficientStock{I1, 5, 7}  ──► abort │
//! │    I2: stock 9  ≥ 2  ──► ok                                     │
//! │                                                                 │
//! │  Write phase ── only reached when every check passed:           │
//! │    UPDATE stock = stock - 7 WHERE id = 'I1'                     │
//! │    UPDATE stock = stock - 2 WHERE id = 'I2'                     │
//! │                                                                 │
//! │  Partial application is impossible: a failed check aborts       │
//! │  before the first UPDATE, and the enclosing transaction rolls   │
//! │  back everything else.                                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Stock never goes negative; the schema CHECK is a backstop, the read
//!   phase is the real gate
//! - Callers sum duplicate line items per id BEFORE reserving, so two
//!   lines of 3 and 4 against stock 5 fail as a single request for 7
//! - Releases (void, credit delete) skip ids whose row no longer exists

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use bodega_core::resolve::NewItemSpec;
use bodega_core::validation::{validate_item_name, validate_price};
use bodega_core::{CoreError, InventoryItem, Money, ValidationError, DEFAULT_NEW_ITEM_STOCK};

use crate::error::StoreResult;

/// Repository for inventory items.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Creates an inventory item.
    ///
    /// ## Arguments
    /// * `name` - Display name (trimmed, 1..=200 chars)
    /// * `price` - Selling price per unit (non-negative)
    /// * `cost` - Acquisition cost per unit (non-negative)
    /// * `stock` - Initial stock level (non-negative)
    pub async fn create(
        &self,
        name: &str,
        price: Money,
        cost: Money,
        stock: i64,
    ) -> StoreResult<InventoryItem> {
        validate_item_name(name).map_err(CoreError::from)?;
        validate_price(price).map_err(CoreError::from)?;
        validate_price(cost).map_err(CoreError::from)?;
        if stock < 0 {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "stock".to_string(),
            })
            .into());
        }

        let item = InventoryItem {
            id: generate_item_id(),
            name: name.trim().to_string(),
            price,
            cost,
            stock,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO inventory_items (id, name, price, cost, stock, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.cost)
        .bind(item.stock)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        debug!(item_id = %item.id, name = %item.name, "Inventory item created");

        Ok(item)
    }

    /// Gets an item by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, name, price, cost, stock, created_at
             FROM inventory_items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all items, sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, name, price, cost, stock, created_at
             FROM inventory_items ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts inventory items.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Updates an item's editable fields.
    ///
    /// Management screens edit these fields directly; no guard beyond
    /// validation and non-negative stock.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        price: Money,
        cost: Money,
        stock: i64,
    ) -> StoreResult<InventoryItem> {
        validate_item_name(name).map_err(CoreError::from)?;
        validate_price(price).map_err(CoreError::from)?;
        validate_price(cost).map_err(CoreError::from)?;
        if stock < 0 {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "stock".to_string(),
            })
            .into());
        }

        let result = sqlx::query(
            "UPDATE inventory_items SET name = ?2, price = ?3, cost = ?4, stock = ?5
             WHERE id = ?1",
        )
        .bind(id)
        .bind(name.trim())
        .bind(price)
        .bind(cost)
        .bind(stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound {
                item_id: id.to_string(),
            }
            .into());
        }

        debug!(item_id = %id, "Inventory item updated");

        match self.get(id).await? {
            Some(item) => Ok(item),
            None => Err(CoreError::ItemNotFound {
                item_id: id.to_string(),
            }
            .into()),
        }
    }

    /// Adjusts stock by a delta (positive = restock, negative = shrinkage).
    ///
    /// Returns the new stock level. The adjustment is refused rather than
    /// letting stock go negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<i64> {
        let result = sqlx::query(
            "UPDATE inventory_items SET stock = stock + ?2
             WHERE id = ?1 AND stock + ?2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Nothing changed: the row is missing, or the delta would have
            // driven stock negative.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM inventory_items WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match available {
                None => Err(CoreError::ItemNotFound {
                    item_id: id.to_string(),
                }
                .into()),
                Some(available) => Err(CoreError::InsufficientStock {
                    item_id: id.to_string(),
                    available,
                    requested: -delta,
                }
                .into()),
            };
        }

        let stock: i64 = sqlx::query_scalar("SELECT stock FROM inventory_items WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        debug!(item_id = %id, delta, stock, "Stock adjusted");

        Ok(stock)
    }

    /// Hard-deletes an item.
    ///
    /// Historical sales keep their line items (the item id inside a sale's
    /// JSON simply stops resolving), so this is safe for bookkeeping and
    /// intended for management cleanup only.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound {
                item_id: id.to_string(),
            }
            .into());
        }

        debug!(item_id = %id, "Inventory item deleted");

        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Reserves stock for every decrement, on the caller's transaction.
///
/// Validates every item first (existence and sufficient stock), then applies
/// every decrement. A failed check returns before the first write, so a
/// reservation never partially applies.
pub(crate) async fn reserve_stock(
    conn: &mut SqliteConnection,
    decrements: &BTreeMap<String, i64>,
) -> StoreResult<()> {
    // Read phase: every check must pass before any stock moves.
    for (item_id, &quantity) in decrements {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM inventory_items WHERE id = ?1")
                .bind(item_id)
                .fetch_optional(&mut *conn)
                .await?;

        let available = stock.ok_or_else(|| CoreError::ItemNotFound {
            item_id: item_id.clone(),
        })?;

        if available < quantity {
            return Err(CoreError::InsufficientStock {
                item_id: item_id.clone(),
                available,
                requested: quantity,
            }
            .into());
        }
    }

    // Write phase.
    for (item_id, &quantity) in decrements {
        sqlx::query("UPDATE inventory_items SET stock = stock - ?2 WHERE id = ?1")
            .bind(item_id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Releases previously reserved stock, on the caller's transaction.
///
/// Items that were administratively deleted since the reservation are
/// skipped; the release restores what still exists.
pub(crate) async fn release_stock(
    conn: &mut SqliteConnection,
    increments: &[(String, i64)],
) -> StoreResult<()> {
    for (item_id, quantity) in increments {
        sqlx::query("UPDATE inventory_items SET stock = stock + ?2 WHERE id = ?1")
            .bind(item_id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Inserts items a sale or credit created on the fly, on the caller's
/// transaction.
///
/// New items start with the line's unit price, zero cost, and the default
/// stock level. The originating transaction does not decrement them.
pub(crate) async fn create_items(
    conn: &mut SqliteConnection,
    new_items: &[NewItemSpec],
) -> StoreResult<()> {
    let created_at = Utc::now();

    for spec in new_items {
        sqlx::query(
            "INSERT INTO inventory_items (id, name, price, cost, stock, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&spec.id)
        .bind(&spec.name)
        .bind(spec.price)
        .bind(Money::zero())
        .bind(DEFAULT_NEW_ITEM_STOCK)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        debug!(item_id = %spec.id, name = %spec.name, "Created item from sale line");
    }

    Ok(())
}

/// Generates a new unique item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Store, StoreConfig};

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

    #[tokio::test]
    async fn test_create_and_get() {
        let store = setup_test_store().await;

        let created = seed_item(&store, "Sardinas", 2500, 10).await;
        let fetched = store.inventory().get(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Sardinas");
        assert_eq!(fetched.price, Money::from_cents(2500));
        assert_eq!(fetched.stock, 10);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let store = setup_test_store().await;

        let result = store
            .inventory()
            .create("   ", Money::from_cents(100), Money::zero(), 0)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_stock() {
        let store = setup_test_store().await;

        let result = store
            .inventory()
            .create("Suka", Money::from_cents(100), Money::zero(), -1)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let store = setup_test_store().await;

        seed_item(&store, "Suka", 1800, 5).await;
        seed_item(&store, "Asin", 1200, 5).await;
        seed_item(&store, "Sardinas", 2500, 5).await;

        let names: Vec<String> = store
            .inventory()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();

        assert_eq!(names, vec!["Asin", "Sardinas", "Suka"]);
        assert_eq!(store.inventory().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_changes_fields() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Sardinas", 2500, 10).await;
        let updated = store
            .inventory()
            .update(
                &item.id,
                "Sardinas (big can)",
                Money::from_cents(3200),
                Money::from_cents(2600),
                12,
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Sardinas (big can)");
        assert_eq!(updated.price, Money::from_cents(3200));
        assert_eq!(updated.cost, Money::from_cents(2600));
        assert_eq!(updated.stock, 12);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let store = setup_test_store().await;

        let result = store
            .inventory()
            .update("nope", "X", Money::zero(), Money::zero(), 0)
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Asin", 1200, 3).await;
        store.inventory().delete(&item.id).await.unwrap();

        assert!(store.inventory().get(&item.id).await.unwrap().is_none());

        let again = store.inventory().delete(&item.id).await;
        assert!(matches!(
            again,
            Err(StoreError::Domain(CoreError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_adjust_stock_applies_delta() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Suka", 1800, 10).await;

        assert_eq!(store.inventory().adjust_stock(&item.id, 5).await.unwrap(), 15);
        assert_eq!(store.inventory().adjust_stock(&item.id, -15).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_stock_refuses_negative_result() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Suka", 1800, 3).await;
        let result = store.inventory().adjust_stock(&item.id, -4).await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }))
        ));

        // Untouched after the refusal.
        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_item() {
        let store = setup_test_store().await;

        let result = store.inventory().adjust_stock("nope", 1).await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_reserve_stock_decrements() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let mut tx = store.pool().begin().await.unwrap();
        let decrements = BTreeMap::from([(item.id.clone(), 4)]);
        reserve_stock(&mut *tx, &decrements).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 6);
    }

    #[tokio::test]
    async fn test_reserve_stock_is_all_or_nothing() {
        let store = setup_test_store().await;

        let plenty = seed_item(&store, "Sardinas", 2500, 10).await;
        let scarce = seed_item(&store, "Asin", 1200, 1).await;

        let mut tx = store.pool().begin().await.unwrap();
        let decrements = BTreeMap::from([(plenty.id.clone(), 5), (scarce.id.clone(), 5)]);
        let result = reserve_stock(&mut *tx, &decrements).await;
        drop(tx);

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            }))
        ));

        // Neither row moved, including the one that had enough.
        assert_eq!(store.inventory().get(&plenty.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.inventory().get(&scarce.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_reserve_stock_unknown_item() {
        let store = setup_test_store().await;

        let mut tx = store.pool().begin().await.unwrap();
        let decrements = BTreeMap::from([("ghost".to_string(), 1)]);
        let result = reserve_stock(&mut *tx, &decrements).await;
        drop(tx);

        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_release_stock_skips_vanished_items() {
        let store = setup_test_store().await;

        let item = seed_item(&store, "Suka", 1800, 5).await;

        let mut tx = store.pool().begin().await.unwrap();
        let increments = vec![(item.id.clone(), 2), ("ghost".to_string(), 9)];
        release_stock(&mut *tx, &increments).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.inventory().get(&item.id).await.unwrap().unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_create_items_seeds_defaults() {
        let store = setup_test_store().await;

        let spec = NewItemSpec {
            id: generate_item_id(),
            name: "Tinapay".to_string(),
            price: Money::from_cents(500),
        };

        let mut tx = store.pool().begin().await.unwrap();
        create_items(&mut *tx, &[spec.clone()]).await.unwrap();
        tx.commit().await.unwrap();

        let item = store.inventory().get(&spec.id).await.unwrap().unwrap();
        assert_eq!(item.name, "Tinapay");
        assert_eq!(item.price, Money::from_cents(500));
        assert_eq!(item.cost, Money::zero());
        assert_eq!(item.stock, DEFAULT_NEW_ITEM_STOCK);
    }
}
