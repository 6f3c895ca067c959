//! # Wallet Repository
//!
//! Daily cash drawer sessions: one per calendar date, opened with a counted
//! float and closed with the end-of-day count.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   One wallet entry per date                     │
//! │                                                                 │
//! │  (no entry) ──start_day──► open ──close_day──► closed           │
//! │       ▲                      │                    │             │
//! │       │                 start_day            start_day,         │
//! │  close_day ──►               │               close_day          │
//! │  WalletNotFound         WalletAlreadyOpen    WalletAlreadyClosed│
//! │                                                                 │
//! │  The date is the PRIMARY KEY: "at most one session per day" is  │
//! │  a constraint the database enforces, not a convention. The      │
//! │  existence check and the insert share one transaction, so two   │
//! │  racing start_day calls cannot both succeed.                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use bodega_core::validation::validate_cash;
use bodega_core::{CoreError, Money, WalletEntry, WalletStatus};

use crate::error::StoreResult;
use crate::repository::with_busy_retry;

/// Repository for wallet entries.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    pool: SqlitePool,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    pub fn new(pool: SqlitePool) -> Self {
        WalletRepository { pool }
    }

    // =========================================================================
    // Coordinators
    // =========================================================================

    /// Opens the cash session for a date with the counted starting float.
    ///
    /// ## Errors
    /// * `WalletAlreadyOpen` - The date already has an open session
    /// * `WalletAlreadyClosed` - The date's session was already closed;
    ///   a day never reopens
    pub async fn start_day(&self, date: NaiveDate, starting_cash: Money) -> StoreResult<WalletEntry> {
        validate_cash(starting_cash).map_err(CoreError::from)?;

        with_busy_retry(|| self.try_start_day(date, starting_cash)).await
    }

    async fn try_start_day(&self, date: NaiveDate, starting_cash: Money) -> StoreResult<WalletEntry> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<WalletStatus> =
            sqlx::query_scalar("SELECT status FROM wallet_entries WHERE date = ?1")
                .bind(date)
                .fetch_optional(&mut *tx)
                .await?;

        match existing {
            Some(WalletStatus::Open) => {
                return Err(CoreError::WalletAlreadyOpen(date.to_string()).into());
            }
            Some(WalletStatus::Closed) => {
                return Err(CoreError::WalletAlreadyClosed(date.to_string()).into());
            }
            None => {}
        }

        let entry = WalletEntry {
            date,
            starting_cash,
            ending_cash: None,
            status: WalletStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        };

        sqlx::query(
            "INSERT INTO wallet_entries (date, starting_cash, ending_cash, status, created_at, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(entry.date)
        .bind(entry.starting_cash)
        .bind(entry.ending_cash)
        .bind(entry.status)
        .bind(entry.created_at)
        .bind(entry.closed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(date = %date, starting_cash = starting_cash.cents(), "Wallet session opened");

        Ok(entry)
    }

    /// Closes the date's session with the counted ending cash.
    ///
    /// ## Errors
    /// * `WalletNotFound` - No session was started for the date
    /// * `WalletAlreadyClosed` - Closing is one-shot
    pub async fn close_day(&self, date: NaiveDate, ending_cash: Money) -> StoreResult<WalletEntry> {
        validate_cash(ending_cash).map_err(CoreError::from)?;

        with_busy_retry(|| self.try_close_day(date, ending_cash)).await
    }

    async fn try_close_day(&self, date: NaiveDate, ending_cash: Money) -> StoreResult<WalletEntry> {
        let mut tx = self.pool.begin().await?;

        let mut entry = match fetch_entry(&mut *tx, date).await? {
            Some(entry) => entry,
            None => return Err(CoreError::WalletNotFound(date.to_string()).into()),
        };

        if entry.status == WalletStatus::Closed {
            return Err(CoreError::WalletAlreadyClosed(date.to_string()).into());
        }

        let closed_at = Utc::now();

        let result = sqlx::query(
            "UPDATE wallet_entries SET ending_cash = ?2, status = 'closed', closed_at = ?3
             WHERE date = ?1 AND status = 'open'",
        )
        .bind(date)
        .bind(ending_cash)
        .bind(closed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::WalletAlreadyClosed(date.to_string()).into());
        }

        tx.commit().await?;

        entry.ending_cash = Some(ending_cash);
        entry.status = WalletStatus::Closed;
        entry.closed_at = Some(closed_at);

        debug!(date = %date, ending_cash = ending_cash.cents(), "Wallet session closed");

        Ok(entry)
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Gets the session for a date.
    pub async fn get_day(&self, date: NaiveDate) -> StoreResult<Option<WalletEntry>> {
        let mut conn = self.pool.acquire().await?;
        fetch_entry(&mut conn, date).await
    }

    /// Lists sessions, most recent date first.
    pub async fn history(&self, limit: i64) -> StoreResult<Vec<WalletEntry>> {
        let entries = sqlx::query_as::<_, WalletEntry>(
            "SELECT date, starting_cash, ending_cash, status, created_at, closed_at
             FROM wallet_entries ORDER BY date DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// The cash the drawer should hold for a date: the starting float plus
    /// every active sale committed that day. The figure the end-of-day
    /// count is reconciled against.
    ///
    /// ## Errors
    /// * `WalletNotFound` - No session was started for the date
    pub async fn expected_cash(&self, date: NaiveDate) -> StoreResult<Money> {
        let entry = match self.get_day(date).await? {
            Some(entry) => entry,
            None => return Err(CoreError::WalletNotFound(date.to_string()).into()),
        };

        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let sales_total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total), 0) FROM sales
             WHERE status = 'active' AND created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry.starting_cash + Money::from_cents(sales_total))
    }
}

/// Loads one date's entry on the given connection.
async fn fetch_entry(
    conn: &mut sqlx::SqliteConnection,
    date: NaiveDate,
) -> StoreResult<Option<WalletEntry>> {
    let entry = sqlx::query_as::<_, WalletEntry>(
        "SELECT date, starting_cash, ending_cash, status, created_at, closed_at
         FROM wallet_entries WHERE date = ?1",
    )
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(entry)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Store, StoreConfig};
    use bodega_core::LineItemDraft;

    async fn setup_test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[tokio::test]
    async fn test_start_day_opens_session() {
        let store = setup_test_store().await;

        let entry = store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();

        assert_eq!(entry.status, WalletStatus::Open);
        assert_eq!(entry.starting_cash, Money::from_cents(10000));
        assert!(entry.ending_cash.is_none());
        assert_eq!(entry.id(), today().to_string());

        let fetched = store.wallet().get_day(today()).await.unwrap().unwrap();
        assert!(fetched.is_open());
    }

    #[tokio::test]
    async fn test_start_day_twice_conflicts() {
        let store = setup_test_store().await;

        store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();

        let again = store
            .wallet()
            .start_day(today(), Money::from_cents(500))
            .await;

        assert!(matches!(
            again,
            Err(StoreError::Domain(CoreError::WalletAlreadyOpen(_)))
        ));

        // The original float is untouched.
        let entry = store.wallet().get_day(today()).await.unwrap().unwrap();
        assert_eq!(entry.starting_cash, Money::from_cents(10000));
    }

    #[tokio::test]
    async fn test_closed_day_never_reopens() {
        let store = setup_test_store().await;

        store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();
        store
            .wallet()
            .close_day(today(), Money::from_cents(12000))
            .await
            .unwrap();

        let restart = store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await;
        assert!(matches!(
            restart,
            Err(StoreError::Domain(CoreError::WalletAlreadyClosed(_)))
        ));
    }

    #[tokio::test]
    async fn test_close_day_records_count() {
        let store = setup_test_store().await;

        store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();
        let closed = store
            .wallet()
            .close_day(today(), Money::from_cents(13550))
            .await
            .unwrap();

        assert_eq!(closed.status, WalletStatus::Closed);
        assert_eq!(closed.ending_cash, Some(Money::from_cents(13550)));
        assert!(closed.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_close_unopened_day() {
        let store = setup_test_store().await;

        let result = store.wallet().close_day(today(), Money::zero()).await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::WalletNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_close_day_twice() {
        let store = setup_test_store().await;

        store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();
        store
            .wallet()
            .close_day(today(), Money::from_cents(11000))
            .await
            .unwrap();

        let again = store
            .wallet()
            .close_day(today(), Money::from_cents(99999))
            .await;
        assert!(matches!(
            again,
            Err(StoreError::Domain(CoreError::WalletAlreadyClosed(_)))
        ));

        // The first count stands.
        let entry = store.wallet().get_day(today()).await.unwrap().unwrap();
        assert_eq!(entry.ending_cash, Some(Money::from_cents(11000)));
    }

    #[tokio::test]
    async fn test_negative_cash_rejected() {
        let store = setup_test_store().await;

        let result = store
            .wallet()
            .start_day(today(), Money::from_cents(-1))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_zero_starting_cash_is_allowed() {
        let store = setup_test_store().await;

        let entry = store.wallet().start_day(today(), Money::zero()).await.unwrap();
        assert_eq!(entry.starting_cash, Money::zero());
    }

    #[tokio::test]
    async fn test_history_most_recent_first() {
        let store = setup_test_store().await;
        let base = today();

        for days_ago in [2i64, 1, 0] {
            store
                .wallet()
                .start_day(base - Duration::days(days_ago), Money::from_cents(1000))
                .await
                .unwrap();
        }

        let history = store.wallet().history(2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, base);
        assert_eq!(history[1].date, base - Duration::days(1));
    }

    #[tokio::test]
    async fn test_expected_cash_adds_active_sales() {
        let store = setup_test_store().await;

        store
            .wallet()
            .start_day(today(), Money::from_cents(10000))
            .await
            .unwrap();

        let item = store
            .inventory()
            .create("Sardinas", Money::from_cents(2500), Money::zero(), 50)
            .await
            .unwrap();
        let draft = |qty: i64| LineItemDraft {
            item_id: Some(item.id.clone()),
            item_name: item.name.clone(),
            quantity: qty,
            unit_price: item.price,
        };

        store.sales().commit_sale(&[draft(2)], None).await.unwrap();
        let voided = store.sales().commit_sale(&[draft(1)], None).await.unwrap();
        store.sales().void_sale(&voided.id).await.unwrap();

        // 100.00 float + 50.00 of active sales; the voided sale is ignored.
        let expected = store.wallet().expected_cash(today()).await.unwrap();
        assert_eq!(expected, Money::from_cents(15000));
    }

    #[tokio::test]
    async fn test_expected_cash_requires_session() {
        let store = setup_test_store().await;

        let result = store.wallet().expected_cash(today()).await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(CoreError::WalletNotFound(_)))
        ));
    }
}
