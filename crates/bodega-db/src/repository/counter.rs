//! # Counter Repository
//!
//! Named monotone counters, used for receipt numbering.
//!
//! ## How Receipt Numbers Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Receipt Numbering                            │
//! │                                                                 │
//! │  counters table:   id = 'saleReceipt', current_number = 41      │
//! │                                                                 │
//! │  commit_sale (inside its transaction):                          │
//! │    1. next_number('saleReceipt')  ──► 42, row now reads 42      │
//! │    2. format_receipt(42)          ──► "000042"                  │
//! │    3. sale id                     ──► "sale-000042"             │
//! │                                                                 │
//! │  The bump commits or rolls back WITH the sale. Two committed    │
//! │  sales can never share a number; a failed commit consumes       │
//! │  nothing.                                                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - `current_number` only ever increases
//! - Voiding a sale does NOT release its number; gaps from voids are
//!   expected and harmless
//! - The bump must happen on the transaction of the write that consumes
//!   the number, never on its own connection

use sqlx::{SqliteConnection, SqlitePool};

use bodega_core::{Counter, RECEIPT_NUMBER_WIDTH};

use crate::error::StoreResult;

/// Repository for named counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    /// Creates a new counter repository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterRepository { pool }
    }

    /// Gets a counter by name.
    ///
    /// Returns `None` if the counter has never been bumped.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Counter>> {
        let counter = sqlx::query_as::<_, Counter>(
            "SELECT id, current_number FROM counters WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(counter)
    }

    /// Current value of a counter. A counter that has never been bumped
    /// reads as zero.
    pub async fn current(&self, id: &str) -> StoreResult<i64> {
        let current: Option<i64> =
            sqlx::query_scalar("SELECT current_number FROM counters WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(current.unwrap_or(0))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Bumps a counter and returns the new value, on the caller's transaction.
///
/// A missing counter row reads as zero, so the first bump yields 1. The
/// read and the upsert share the caller's transaction; under concurrent
/// commits the losing transaction aborts busy and retries from the top,
/// which is what keeps the sequence gapless.
pub(crate) async fn next_number(conn: &mut SqliteConnection, id: &str) -> StoreResult<i64> {
    let current: Option<i64> =
        sqlx::query_scalar("SELECT current_number FROM counters WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    let next = current.unwrap_or(0) + 1;

    sqlx::query(
        "INSERT INTO counters (id, current_number) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET current_number = excluded.current_number",
    )
    .bind(id)
    .bind(next)
    .execute(&mut *conn)
    .await?;

    Ok(next)
}

/// Formats a counter value as a receipt number.
///
/// ## Example
/// ```rust,ignore
/// assert_eq!(format_receipt(42), "000042");
/// ```
pub fn format_receipt(number: i64) -> String {
    format!("{:0width$}", number, width = RECEIPT_NUMBER_WIDTH)
}

// =============================================================================
// Unit Tests
// =============================================================================
