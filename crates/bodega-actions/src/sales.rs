//! # Sale Actions
//!
//! The checkout and history surface.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Commit Sale Flow                                     │
//! │                                                                         │
//! │  Cashier taps "Bayad"                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit_sale(store, drafts, customer_name)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One SQLite transaction:                                                │
//! │    resolve lines → reserve stock → bump counter → insert sale           │
//! │       │                                                                 │
//! │       ├── ok ──► {success: true, receiptNumber: "000042", sale}         │
//! │       │                                                                 │
//! │       └── any failure ──► {success: false, message}                     │
//! │                           (stock untouched, counter untouched)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bodega_core::{LineItemDraft, SaleTransaction};
use bodega_db::{DailySalesSummary, Store};

use crate::error::failure_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSaleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidSaleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSalesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub sales: Vec<SaleTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummaryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DailySalesSummary>,
}

/// Commits a sale: all lines reserve stock and the receipt is numbered, or
/// nothing happens at all.
///
/// ## Arguments
/// * `drafts` - The checkout lines (existing items by id, new items by name)
/// * `customer_name` - Free-text name printed on the receipt, if any
///
/// ## Returns
/// The committed sale with its zero-padded receipt number, or the reason
/// the whole commit was rejected.
pub async fn commit_sale(
    store: &Store,
    drafts: &[LineItemDraft],
    customer_name: Option<&str>,
) -> CommitSaleResponse {
    debug!(lines = drafts.len(), "commit_sale action");

    match store.sales().commit_sale(drafts, customer_name).await {
        Ok(sale) => {
            info!(sale_id = %sale.id, receipt = %sale.receipt_number, total = %sale.total, "Sale committed");
            CommitSaleResponse {
                success: true,
                message: None,
                receipt_number: Some(sale.receipt_number.clone()),
                sale: Some(sale),
            }
        }
        Err(err) => CommitSaleResponse {
            success: false,
            message: Some(failure_message(err)),
            receipt_number: None,
            sale: None,
        },
    }
}

/// Voids a sale and restores the stock it reserved, exactly once.
///
/// ## Arguments
/// * `sale_id` - The sale's document id (e.g. `sale-000042`)
///
/// ## Returns
/// The voided sale, or the reason nothing changed (unknown id, already
/// voided).
pub async fn void_sale(store: &Store, sale_id: &str) -> VoidSaleResponse {
    debug!(sale_id = %sale_id, "void_sale action");

    match store.sales().void_sale(sale_id).await {
        Ok(sale) => {
            info!(sale_id = %sale.id, "Sale voided");
            VoidSaleResponse {
                success: true,
                message: None,
                sale: Some(sale),
            }
        }
        Err(err) => VoidSaleResponse {
            success: false,
            message: Some(failure_message(err)),
            sale: None,
        },
    }
}

/// Lists the most recent sales, newest first, for the history screen.
pub async fn recent_sales(store: &Store, limit: i64) -> RecentSalesResponse {
    debug!(limit, "recent_sales action");

    match store.sales().list_recent(limit).await {
        Ok(sales) => RecentSalesResponse {
            success: true,
            message: None,
            sales,
        },
        Err(err) => RecentSalesResponse {
            success: false,
            message: Some(failure_message(err)),
            sales: Vec::new(),
        },
    }
}

/// Counts and totals one day's active sales for the dashboard.
///
/// Voided sales are excluded.
pub async fn daily_summary(store: &Store, date: NaiveDate) -> DailySummaryResponse {
    debug!(%date, "daily_summary action");

    match store.sales().sales_summary(date).await {
        Ok(summary) => DailySummaryResponse {
            success: true,
            message: None,
            summary: Some(summary),
        },
        Err(err) => DailySummaryResponse {
            success: false,
            message: Some(failure_message(err)),
            summary: None,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::{InventoryItem, Money};
    use bodega_db::StoreConfig;
    use chrono::Utc;

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

    #[tokio::test]
    async fn test_commit_sale_returns_receipt_envelope() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Sardinas", 2500, 10).await;

        let response = commit_sale(&store, &[draft_for(&item, 2)], Some("Aling Nena")).await;

        assert!(response.success);
        assert!(response.message.is_none());
        assert_eq!(response.receipt_number.as_deref(), Some("000001"));
        assert_eq!(
            response.sale.as_ref().map(|s| s.total),
            Some(Money::from_cents(5000))
        );
    }

    #[tokio::test]
    async fn test_commit_sale_failure_carries_the_reason() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Suka", 1800, 1).await;

        let response = commit_sale(&store, &[draft_for(&item, 3)], None).await;

        assert!(!response.success);
        assert!(response.sale.is_none());
        assert_eq!(
            response.message.unwrap(),
            format!("Insufficient stock for {}: available 1, requested 3", item.id)
        );

        // The envelope reports failure and the store shows no trace of it
        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 1);
    }

    #[tokio::test]
    async fn test_empty_checkout_is_rejected_at_the_boundary() {
        let store = setup_test_store().await;

        let response = commit_sale(&store, &[], None).await;

        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Validation error: line items is required")
        );
    }

    #[tokio::test]
    async fn test_void_sale_once_then_refuse() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Bigas", 5200, 10).await;

        let committed = commit_sale(&store, &[draft_for(&item, 2)], None).await;
        let sale_id = committed.sale.unwrap().id;

        let first = void_sale(&store, &sale_id).await;
        assert!(first.success);
        let stock = store.inventory().get(&item.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);

        let second = void_sale(&store, &sale_id).await;
        assert!(!second.success);
        assert_eq!(
            second.message.unwrap(),
            format!("Sale {} is already voided", sale_id)
        );
    }

    #[tokio::test]
    async fn test_void_unknown_sale_reports_not_found() {
        let store = setup_test_store().await;

        let response = void_sale(&store, "sale-999999").await;

        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Sale not found: sale-999999")
        );
    }

    #[tokio::test]
    async fn test_recent_sales_and_daily_summary_read_back() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Kape", 800, 50).await;

        commit_sale(&store, &[draft_for(&item, 1)], None).await;
        commit_sale(&store, &[draft_for(&item, 2)], None).await;

        let recent = recent_sales(&store, 10).await;
        assert!(recent.success);
        assert_eq!(recent.sales.len(), 2);
        assert_eq!(recent.sales[0].receipt_number, "000002");

        let today = daily_summary(&store, Utc::now().date_naive()).await;
        assert!(today.success);
        let summary = today.summary.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, Money::from_cents(2400));
    }

    #[tokio::test]
    async fn test_envelope_serializes_camel_case_and_drops_empty_fields() {
        let store = setup_test_store().await;
        let item = seed_item(&store, "Toyo", 2000, 5).await;

        let response = commit_sale(&store, &[draft_for(&item, 1)], None).await;
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["receiptNumber"], serde_json::json!("000001"));
        assert!(json.get("message").is_none());
        assert_eq!(json["sale"]["receiptNumber"], serde_json::json!("000001"));

        let failure = commit_sale(&store, &[], None).await;
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["success"], serde_json::json!(false));
        assert!(json.get("receiptNumber").is_none());
        assert!(json["message"].as_str().unwrap().contains("line items"));
    }
}
