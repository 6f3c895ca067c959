//! # Inventory Actions
//!
//! Shelf administration: add, reprice, restock, remove.
//!
//! Checkout and credit flows never call these; they reserve stock inside
//! their own transactions. These actions exist for the inventory screen.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bodega_core::{InventoryItem, Money};
use bodega_db::Store;

use crate::error::failure_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<InventoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The stock level after the adjustment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub items: Vec<InventoryItem>,
}

/// Puts a new item on the shelf.
pub async fn add_item(
    store: &Store,
    name: &str,
    price: Money,
    cost: Money,
    stock: i64,
) -> ItemResponse {
    debug!(name = %name, price = %price, stock, "add_item action");

    match store.inventory().create(name, price, cost, stock).await {
        Ok(item) => {
            info!(item_id = %item.id, name = %item.name, "Item added");
            ItemResponse {
                success: true,
                message: None,
                item: Some(item),
            }
        }
        Err(err) => ItemResponse {
            success: false,
            message: Some(failure_message(err)),
            item: None,
        },
    }
}

/// Rewrites an item's name, prices, and counted stock.
pub async fn update_item(
    store: &Store,
    id: &str,
    name: &str,
    price: Money,
    cost: Money,
    stock: i64,
) -> ItemResponse {
    debug!(item_id = %id, "update_item action");

    match store.inventory().update(id, name, price, cost, stock).await {
        Ok(item) => {
            info!(item_id = %item.id, "Item updated");
            ItemResponse {
                success: true,
                message: None,
                item: Some(item),
            }
        }
        Err(err) => ItemResponse {
            success: false,
            message: Some(failure_message(err)),
            item: None,
        },
    }
}

/// Nudges an item's stock by a delta (restock, breakage, recount).
///
/// Refused when the delta would push stock below zero.
pub async fn adjust_stock(store: &Store, id: &str, delta: i64) -> AdjustStockResponse {
    debug!(item_id = %id, delta, "adjust_stock action");

    match store.inventory().adjust_stock(id, delta).await {
        Ok(stock) => {
            info!(item_id = %id, stock, "Stock adjusted");
            AdjustStockResponse {
                success: true,
                message: None,
                stock: Some(stock),
            }
        }
        Err(err) => AdjustStockResponse {
            success: false,
            message: Some(failure_message(err)),
            stock: None,
        },
    }
}

/// Takes an item off the shelf for good.
pub async fn delete_item(store: &Store, id: &str) -> DeleteItemResponse {
    debug!(item_id = %id, "delete_item action");

    match store.inventory().delete(id).await {
        Ok(()) => {
            info!(item_id = %id, "Item deleted");
            DeleteItemResponse {
                success: true,
                message: None,
            }
        }
        Err(err) => DeleteItemResponse {
            success: false,
            message: Some(failure_message(err)),
        },
    }
}

/// Lists the whole shelf, sorted by name.
pub async fn list_items(store: &Store) -> ListItemsResponse {
    debug!("list_items action");

    match store.inventory().list().await {
        Ok(items) => ListItemsResponse {
            success: true,
            message: None,
            items,
        },
        Err(err) => ListItemsResponse {
            success: false,
            message: Some(failure_message(err)),
            items: Vec::new(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
