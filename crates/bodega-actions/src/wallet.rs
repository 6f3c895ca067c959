//! # Wallet Actions
//!
//! Daily cash sessions: open the drawer in the morning, count it at night.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Wallet Session Lifecycle                             │
//! │                                                                         │
//! │  start_day(date, ₱500)          close_day(date, counted cash)           │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  ┌──────────┐   exactly once    ┌──────────┐   final                    │
//! │  │   open   │ ────────────────► │  closed  │   (never reopens)          │
//! │  └──────────┘                   └──────────┘                            │
//! │       │                                                                 │
//! │       │  wallet_status(date)                                            │
//! │       ▼                                                                 │
//! │  expectedCash = startingCash + that day's active sales                  │
//! │  (the figure to reconcile the physical drawer against)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bodega_core::{Money, WalletEntry};
use bodega_db::Store;

use crate::error::failure_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<WalletEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseDayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<WalletEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Absent when no session exists for the date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<WalletEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_cash: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletHistoryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub entries: Vec<WalletEntry>,
}

/// Opens the day's cash session with the float counted into the drawer.
///
/// One session per calendar date, ever: a closed session never reopens.
pub async fn start_day(store: &Store, date: NaiveDate, starting_cash: Money) -> StartDayResponse {
    debug!(%date, starting_cash = %starting_cash, "start_day action");

    match store.wallet().start_day(date, starting_cash).await {
        Ok(entry) => {
            info!(%date, starting_cash = %starting_cash, "Wallet session opened");
            StartDayResponse {
                success: true,
                message: None,
                entry: Some(entry),
            }
        }
        Err(err) => StartDayResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
        },
    }
}

/// Closes the day's session with the cash physically counted at night.
pub async fn close_day(store: &Store, date: NaiveDate, ending_cash: Money) -> CloseDayResponse {
    debug!(%date, ending_cash = %ending_cash, "close_day action");

    match store.wallet().close_day(date, ending_cash).await {
        Ok(entry) => {
            info!(%date, ending_cash = %ending_cash, "Wallet session closed");
            CloseDayResponse {
                success: true,
                message: None,
                entry: Some(entry),
            }
        }
        Err(err) => CloseDayResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
        },
    }
}

/// Reads one date's session and the cash the drawer should hold.
///
/// A date with no session is not an error: the envelope succeeds with no
/// entry, and the UI offers to start the day.
pub async fn wallet_status(store: &Store, date: NaiveDate) -> WalletStatusResponse {
    debug!(%date, "wallet_status action");

    let entry = match store.wallet().get_day(date).await {
        Ok(entry) => entry,
        Err(err) => {
            return WalletStatusResponse {
                success: false,
                message: Some(failure_message(err)),
                entry: None,
                expected_cash: None,
            }
        }
    };

    let entry = match entry {
        Some(entry) => entry,
        None => {
            return WalletStatusResponse {
                success: true,
                message: None,
                entry: None,
                expected_cash: None,
            }
        }
    };

    match store.wallet().expected_cash(date).await {
        Ok(expected) => WalletStatusResponse {
            success: true,
            message: None,
            entry: Some(entry),
            expected_cash: Some(expected),
        },
        Err(err) => WalletStatusResponse {
            success: false,
            message: Some(failure_message(err)),
            entry: None,
            expected_cash: None,
        },
    }
}

/// Lists past sessions, most recent date first.
pub async fn wallet_history(store: &Store, limit: i64) -> WalletHistoryResponse {
    debug!(limit, "wallet_history action");

    match store.wallet().history(limit).await {
        Ok(entries) => WalletHistoryResponse {
            success: true,
            message: None,
            entries,
        },
        Err(err) => WalletHistoryResponse {
            success: false,
            message: Some(failure_message(err)),
            entries: Vec::new(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
