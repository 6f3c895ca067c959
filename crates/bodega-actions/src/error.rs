//! # Boundary Error Flattening
//!
//! How storage errors become envelope messages.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow at the Boundary                           │
//! │                                                                         │
//! │  UI event handler              Rust Backend                             │
//! │  ────────────────              ────────────                             │
//! │                                                                         │
//! │  await commit_sale(...)                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Action Function (always returns an envelope)                    │  │
//! │  │                                                                  │  │
//! │  │  Business rule violated? ── "Insufficient stock for …" ──┐      │  │
//! │  │         │                                                │      │  │
//! │  │         ▼                                                ▼      │  │
//! │  │  Storage failed? ── log detail, generic message ── {success:    │  │
//! │  │         │                                           false,      │  │
//! │  │         ▼                                           message} ──►│  │
//! │  │  Success ── {success: true, payload} ──────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The caller never sees an Err and never needs a structured code:        │
//! │  the message string is the user-visible reason.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bodega_db::StoreError;
use tracing::error;

/// Flattens a storage error into the envelope's `message` string.
///
/// ## Rules
/// - Business rule violations pass through unchanged: their messages
///   already carry the data the user needs ("available 5, requested 7",
///   the outstanding balance, the wallet date).
/// - Infrastructure failures are logged in full and surfaced as a generic
///   message: SQL details and file paths are not for the cashier.
pub(crate) fn failure_message(err: StoreError) -> String {
    match err {
        StoreError::Domain(e) => e.to_string(),

        StoreError::ConnectionFailed(detail)
        | StoreError::MigrationFailed(detail)
        | StoreError::QueryFailed(detail)
        | StoreError::Internal(detail) => {
            error!(%detail, "Storage failure behind the action boundary");
            "Database operation failed".to_string()
        }

        StoreError::ForeignKeyViolation { message } => {
            error!(%message, "Foreign key violation behind the action boundary");
            "Invalid reference".to_string()
        }

        StoreError::Serialization(e) => {
            error!(error = %e, "Document encoding failed behind the action boundary");
            "Database operation failed".to_string()
        }

        // NotFound, UniqueViolation, Busy and TransactionAborted already
        // read as human sentences.
        other => other.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
