//! # Storage Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (business rule)         │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  StoreError (this module) ← one error type per repository call         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Action envelope ← {success: false, message} for the caller            │
//! │                                                                         │
//! │  Domain errors pass through transparently: "Insufficient stock for     │
//! │  i1: available 5, requested 7" reads the same at every layer.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bodega_core::CoreError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and carry business rule violations
/// (`CoreError`) detected inside a transaction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule inside the transaction rejected the operation.
    ///
    /// ## When This Occurs
    /// - Insufficient stock during a sale or credit commit
    /// - Voiding an already-voided sale
    /// - Deleting a customer with an outstanding balance
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Administrative update/delete against an id with no row
    /// - `fetch_one` returns no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate receipt number
    /// - Second wallet session inserted for the same date
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Ledger entry referencing a non-existent customer id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The write lock is held by another transaction.
    ///
    /// Retryable: the coordinators re-run their whole transaction a bounded
    /// number of times before giving up.
    #[error("The database is busy")]
    Busy,

    /// A transaction gave up after exhausting its busy retries.
    #[error("Transaction aborted: the store stayed busy across retries")]
    TransactionAborted,

    /// A JSON document column failed to encode or decode.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when retrying the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy)
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for busy / constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::Busy (retryable)
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for the cases we branch on:
                // busy:   "database is locked" / "database table is locked"
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("database is locked") || msg.contains("database table is locked") {
                    StoreError::Busy
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::Busy,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through_transparently() {
        let core = CoreError::InsufficientStock {
            item_id: "i1".to_string(),
            available: 5,
            requested: 7,
        };
        let store: StoreError = core.into();

        assert_eq!(
            store.to_string(),
            "Insufficient stock for i1: available 5, requested 7"
        );
    }

    #[test]
    fn test_only_busy_is_retryable() {
        assert!(StoreError::Busy.is_retryable());
        assert!(!StoreError::TransactionAborted.is_retryable());
        assert!(!StoreError::not_found("Sale", "sale-000001").is_retryable());
    }
}
