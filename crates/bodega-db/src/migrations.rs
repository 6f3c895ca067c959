//! # Database Migrations
//!
//! SQL migration management using sqlx's embedded migrator.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Migration Process                           │
//! │                                                                 │
//! │  Migration files (compile-time embedded):                       │
//! │    migrations/sqlite/                                           │
//! │      └── 001_initial_schema.sql                                 │
//! │                                                                 │
//! │  At runtime:                                                    │
//! │    1. Check _sqlx_migrations table for applied migrations       │
//! │    2. Apply any pending migrations in order                     │
//! │    3. Record each applied migration with checksum               │
//! │                                                                 │
//! │  Result: Database schema always matches code expectations       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding A New Migration
//! 1. Create `migrations/sqlite/00X_description.sql`
//! 2. Write forward-only SQL (no down migrations)
//! 3. Rebuild: the file embeds into the binary

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

use crate::error::StoreResult;

/// Embedded migrations from the migrations/sqlite directory.
///
/// Path is relative to this crate's Cargo.toml.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations on the given pool.
///
/// ## Idempotency
/// Safe to call multiple times. Already-applied migrations are skipped
/// (tracked in the `_sqlx_migrations` table).
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Returns the list of applied migration versions.
///
/// ## Usage
/// Diagnostics: verify which schema version a database file is at.
pub async fn applied_versions(pool: &SqlitePool) -> StoreResult<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(v,)| v).collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
