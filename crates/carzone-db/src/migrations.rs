//! # Database Migrations
//!
//! The CarZone schema ships inside the binary; `Database::new` applies it
//! unless `DbConfig::run_migrations(false)` was set.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql  # engine + car tables, FK, brand index
//! ```
//!
//! New schema changes go in a new `NNN_description.sql` file. Applied files
//! are checksummed in `_sqlx_migrations`, so editing one breaks startup.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Bookkeeping table sqlx creates on the first run.
const MIGRATIONS_TABLE: &str = "_sqlx_migrations";

/// Applies every pending migration, each in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(available = MIGRATOR.migrations.len(), "Applying schema migrations");

    MIGRATOR.run(pool).await?;

    info!("Schema is up to date");
    Ok(())
}

/// Returns (embedded, applied) migration counts.
///
/// A database that never ran migrations reports zero applied; any other
/// failure (closed pool, unreadable file) is returned as an error.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let applied: i64 = match sqlx::query_scalar(
        "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1",
    )
    .fetch_one(pool)
    .await
    {
        Ok(count) => count,
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("no such table") => {
            debug!(table = MIGRATIONS_TABLE, "Migrations table not created yet");
            0
        }
        Err(e) => return Err(DbError::from(e)),
    };

    let applied = usize::try_from(applied)
        .map_err(|_| DbError::Internal(format!("negative migration count: {applied}")))?;

    Ok((embedded, applied))
}
