//! # Customer Repository
//!
//! Customer lifecycle: creation with an optional starting credit, and the
//! balance-gated soft delete.
//!
//! ## Deletion Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              delete_customer (one transaction)                  │
//! │                                                                 │
//! │  load customer ── absent?  ──► CustomerNotFound                 │
//! │       │          deleted? ──► CustomerDeleted                   │
//! │       ▼                                                         │
//! │  balance = Σ (amount − paidAmount) over active credits          │
//! │       │                                                         │
//! │       ├── balance ≠ 0 ──► OutstandingBalance{₱50.00}  ──► abort │
//! │       │                                                         │
//! │       └── balance = 0 ──► mark every ledger entry deleted,      │
//! │                           mark the customer deleted, COMMIT     │
//! │                                                                 │
//! │  The balance read and both updates share one transaction, so a  │
//! │  credit recorded concurrently cannot slip past the gate.        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Deletion is soft; the rows stay for history readers
//! - Deleting a customer does NOT restore inventory taken on credit

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use bodega_core::allocate::outstanding_balance;
use bodega_core::validation::{validate_customer_name, validate_description};
use bodega_core::{
    CoreError, Customer, CustomerStatus, EntryKind, EntryStatus, LedgerEntry, Money,
    ValidationError,
};

use crate::error::StoreResult;
use crate::repository::ledger::{generate_entry_id, insert_entry, open_credits};
use crate::repository::with_busy_retry;

/// A customer row joined with their computed outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithBalance {
    pub id: String,
    pub name: String,
    pub status: CustomerStatus,
    pub created_at: chrono::DateTime<Utc>,
    /// Σ (amount − paidAmount) over the customer's active credits.
    pub balance: Money,
}

/// Repository for customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    // =========================================================================
    // Coordinators
    // =========================================================================

    /// Adds a customer, optionally opening their ledger with a starting
    /// credit.
    ///
    /// ## Arguments
    /// * `name` - Customer name (trimmed, 1..=100 chars)
    /// * `initial_amount` - Starting debt; zero means no opening entry
    /// * `description` - Note on the opening credit, if any
    pub async fn add_customer(
        &self,
        name: &str,
        initial_amount: Money,
        description: Option<&str>,
    ) -> StoreResult<Customer> {
        validate_customer_name(name).map_err(CoreError::from)?;
        validate_description(description).map_err(CoreError::from)?;
        if initial_amount.is_negative() {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "initial amount".to_string(),
            })
            .into());
        }

        with_busy_retry(|| self.try_add_customer(name, initial_amount, description)).await
    }

    async fn try_add_customer(
        &self,
        name: &str,
        initial_amount: Money,
        description: Option<&str>,
    ) -> StoreResult<Customer> {
        let mut tx = self.pool.begin().await?;

        let customer = Customer {
            id: generate_customer_id(),
            name: name.trim().to_string(),
            status: CustomerStatus::Active,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO customers (id, name, status, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(customer.status)
            .bind(customer.created_at)
            .execute(&mut *tx)
            .await?;

        if initial_amount.is_positive() {
            let entry = LedgerEntry {
                id: generate_entry_id(),
                customer_id: customer.id.clone(),
                kind: EntryKind::Credit,
                amount: initial_amount,
                description: description.map(|text| text.trim().to_string()),
                items: None,
                paid_amount: Some(Money::zero()),
                paid_credit_ids: None,
                status: EntryStatus::Active,
                created_at: Utc::now(),
                deleted_at: None,
            };
            insert_entry(&mut tx, &entry).await?;
        }

        tx.commit().await?;

        debug!(
            customer_id = %customer.id,
            name = %customer.name,
            starting_debt = initial_amount.cents(),
            "Customer added"
        );

        Ok(customer)
    }

    /// Soft-deletes a customer and all their ledger entries.
    ///
    /// ## Errors
    /// * `CustomerNotFound` - No customer with this id
    /// * `CustomerDeleted` - Already deleted
    /// * `OutstandingBalance` - Active credits still carry unpaid amounts;
    ///   the debt must be settled (or the credits deleted) first
    pub async fn delete_customer(&self, id: &str) -> StoreResult<Customer> {
        with_busy_retry(|| self.try_delete_customer(id)).await
    }

    async fn try_delete_customer(&self, id: &str) -> StoreResult<Customer> {
        let mut tx = self.pool.begin().await?;

        let mut customer = require_customer(&mut tx, id).await?;
        if customer.status == CustomerStatus::Deleted {
            return Err(CoreError::CustomerDeleted(id.to_string()).into());
        }

        let credits = open_credits(&mut tx, id).await?;
        let balance = outstanding_balance(&credits);
        if !balance.is_zero() {
            return Err(CoreError::OutstandingBalance { balance }.into());
        }

        let deleted_at = Utc::now();

        sqlx::query(
            "UPDATE ledger_entries SET status = 'deleted', deleted_at = ?2
             WHERE customer_id = ?1 AND status = 'active'",
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("UPDATE customers SET status = 'deleted' WHERE id = ?1 AND status = 'active'")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CustomerDeleted(id.to_string()).into());
        }

        tx.commit().await?;

        customer.status = CustomerStatus::Deleted;

        debug!(customer_id = %id, "Customer deleted");

        Ok(customer)
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Gets a customer by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, status, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists active customers with their outstanding balances, sorted by
    /// name.
    pub async fn list_active(&self) -> StoreResult<Vec<CustomerWithBalance>> {
        let customers = sqlx::query_as::<_, CustomerWithBalance>(
            "SELECT c.id, c.name, c.status, c.created_at,
                    COALESCE(SUM(CASE
                        WHEN e.kind = 'credit' AND e.status = 'active'
                        THEN e.amount - COALESCE(e.paid_amount, 0)
                        ELSE 0
                    END), 0) AS balance
             FROM customers c
             LEFT JOIN ledger_entries e ON e.customer_id = c.id
             WHERE c.status = 'active'
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Loads a customer on the caller's transaction, failing if absent.
pub(crate) async fn require_customer(
    conn: &mut SqliteConnection,
    id: &str,
) -> StoreResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, status, created_at FROM customers WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match customer {
        Some(customer) => Ok(customer),
        None => Err(CoreError::CustomerNotFound(id.to_string()).into()),
    }
}

/// Loads a customer that must still be active, on the caller's transaction.
pub(crate) async fn require_active_customer(
    conn: &mut SqliteConnection,
    id: &str,
) -> StoreResult<Customer> {
    let customer = require_customer(conn, id).await?;
    if customer.status == CustomerStatus::Deleted {
        return Err(CoreError::CustomerDeleted(id.to_string()).into());
    }
    Ok(customer)
}

/// Generates a new unique customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
