//! # Customer Actions
//!
//! Suki management: who is in the notebook, and who may leave it.
//!
//! ## Deletion Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Delete Customer Flow                                 │
//! │                                                                         │
//! │  delete_customer(store, id)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One SQLite transaction:                                                │
//! │    read open credits → sum (amount − paidAmount)                        │
//! │       │                                                                 │
//! │       ├── balance > 0 ──► {success: false,                              │
//! │       │                    message: "…outstanding balance of ₱50.00"}   │
//! │       │                                                                 │
//! │       └── settled ──► mark every entry deleted, mark customer deleted   │
//! │                       ──► {success: true}                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bodega_core::{Customer, Money};
use bodega_db::{CustomerWithBalance, Store};

use crate::error::failure_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCustomerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCustomerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCustomersResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub customers: Vec<CustomerWithBalance>,
}

/// Adds a customer, optionally opening their notebook with a starting
/// credit carried over from elsewhere.
///
/// ## Arguments
/// * `name` - Required, non-blank
/// * `initial_amount` - Zero for a clean page, positive to carry utang in
/// * `description` - Note attached to the carried-in credit
pub async fn add_customer(
    store: &Store,
    name: &str,
    initial_amount: Money,
    description: Option<&str>,
) -> AddCustomerResponse {
    debug!(name = %name, initial = %initial_amount, "add_customer action");

    match store.customers().add_customer(name, initial_amount, description).await {
        Ok(customer) => {
            info!(customer_id = %customer.id, name = %customer.name, "Customer added");
            AddCustomerResponse {
                success: true,
                message: None,
                customer: Some(customer),
            }
        }
        Err(err) => AddCustomerResponse {
            success: false,
            message: Some(failure_message(err)),
            customer: None,
        },
    }
}

/// Deletes a customer, but only once their notebook page is settled.
///
/// Every ledger entry of theirs is marked deleted with them. Goods from
/// historical credits stay sold.
pub async fn delete_customer(store: &Store, customer_id: &str) -> DeleteCustomerResponse {
    debug!(customer_id = %customer_id, "delete_customer action");

    match store.customers().delete_customer(customer_id).await {
        Ok(customer) => {
            info!(customer_id = %customer.id, "Customer deleted");
            DeleteCustomerResponse {
                success: true,
                message: None,
            }
        }
        Err(err) => DeleteCustomerResponse {
            success: false,
            message: Some(failure_message(err)),
        },
    }
}

/// Lists active customers with their outstanding balances, sorted by name.
pub async fn list_customers(store: &Store) -> ListCustomersResponse {
    debug!("list_customers action");

    match store.customers().list_active().await {
        Ok(customers) => ListCustomersResponse {
            success: true,
            message: None,
            customers,
        },
        Err(err) => ListCustomersResponse {
            success: false,
            message: Some(failure_message(err)),
            customers: Vec::new(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
