//! # Repository Layer
//!
//! Data access following the repository pattern.
//!
//! ## Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Repository Layer                           │
//! │                                                                 │
//! │  InventoryRepository ──► inventory_items table                  │
//! │  CounterRepository   ──► counters table                         │
//! │  SaleRepository      ──► sales (+ inventory, counters)          │
//! │  CustomerRepository  ──► customers (+ ledger_entries)           │
//! │  LedgerRepository    ──► ledger_entries (+ inventory)           │
//! │  WalletRepository    ──► wallet_entries (+ sales)               │
//! │                                                                 │
//! │  Each repository:                                               │
//! │  - Owns queries for one aggregate                               │
//! │  - Holds a cheap clone of the pool                              │
//! │  - Runs multi-table writes inside one transaction               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Convention
//! Public write operations wrap a private `try_*` attempt in
//! [`with_busy_retry`]. The attempt opens one transaction, does every read
//! and write on that transaction, and commits; any error rolls the whole
//! attempt back. Helpers that must run inside a caller's transaction take
//! `&mut SqliteConnection` and are `pub(crate)`.

pub mod counter;
pub mod customer;
pub mod inventory;
pub mod ledger;
pub mod sale;
pub mod wallet;

pub use counter::CounterRepository;
pub use customer::CustomerRepository;
pub use inventory::InventoryRepository;
pub use ledger::LedgerRepository;
pub use sale::SaleRepository;
pub use wallet::WalletRepository;

use std::future::Future;

use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// How many times a write transaction is attempted before giving up.
pub(crate) const MAX_TX_RETRIES: u32 = 3;

/// Runs a transactional closure, retrying while the database reports busy.
///
/// SQLite allows one writer at a time; under concurrent commits a
/// transaction can fail to acquire the write lock even after the connection's
/// busy timeout. Those failures are transient, so the whole attempt (a fresh
/// transaction) is retried up to [`MAX_TX_RETRIES`] times. Domain errors are
/// never retried.
pub(crate) async fn with_busy_retry<T, F, Fut>(op: F) -> StoreResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    for attempt in 1..=MAX_TX_RETRIES {
        match op().await {
            Err(err) if err.is_retryable() => {
                warn!(
                    attempt,
                    max = MAX_TX_RETRIES,
                    "database busy, retrying write transaction"
                );
            }
            other => return other,
        }
    }

    Err(StoreError::TransactionAborted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::CoreError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let calls = AtomicU32::new(0);

        let result = with_busy_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(StoreError::Busy)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: StoreResult<()> = with_busy_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Busy) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::TransactionAborted)));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TX_RETRIES);
    }

    #[tokio::test]
    async fn test_domain_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: StoreResult<()> = with_busy_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StoreError::Domain(CoreError::SaleNotFound(
                    "sale-000001".to_string(),
                )))
            }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Domain(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
