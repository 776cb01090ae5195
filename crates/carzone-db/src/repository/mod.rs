//! # Store Module
//!
//! One store per entity, composed only through `car.engine_id → engine.id`.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Every mutating store call                              │
//! │                                                                         │
//! │  parse ID ──✗──► DbError::InvalidId        (no statement executed)      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  let mut tx = begin_write(&pool)   (BEGIN IMMEDIATE)                    │
//! │     │                                                                   │
//! │     ├── statement 1 ──✗──► return Err ─┐                               │
//! │     ├── statement 2 ──✗──► return Err ─┤  tx dropped → ROLLBACK        │
//! │     ├── decode RETURNING row ──✗───────┘                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  commit(tx) ── only reached when every step succeeded → COMMIT          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transactions take SQLite's write lock up front. A deferred `BEGIN` that
//! reads first and writes second cannot upgrade its lock while another
//! connection writes (WAL returns `SQLITE_BUSY` without waiting), whereas
//! `BEGIN IMMEDIATE` queues on the busy timeout like a plain write.
//!
//! Dropping the returned future (caller timeout, aborted request) drops the
//! transaction too, so cancellation also rolls back.
//!
//! ## Available Stores
//!
//! - [`EngineStore`](engine::EngineStore) - Engine CRUD
//! - [`CarStore`](car::CarStore) - Car CRUD, brand lookup, engine existence check

pub mod car;
pub mod engine;

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use carzone_core::validation::parse_uuid;

/// Parses a caller-supplied ID, mapping any syntax problem to `InvalidId`.
pub(crate) fn parse_id(entity: &str, id: &str) -> DbResult<Uuid> {
    parse_uuid("id", id).map_err(|_| DbError::invalid_id(entity, id))
}

/// Parses an ID read back from the database.
pub(crate) fn decode_id(entity: &str, raw: &str) -> DbResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| DbError::Internal(format!("stored {entity} id '{raw}' is not a UUID: {e}")))
}

/// Opens a transaction holding the database write lock.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await.map_err(|e| match e {
        sqlx::Error::Database(db_err) => DbError::TransactionFailed(db_err.message().to_string()),
        other => DbError::from(other),
    })
}

/// Commits a transaction, reporting failure as `TransactionFailed`.
pub(crate) async fn commit(tx: Transaction<'_, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}
