//! # Engine Store
//!
//! Database operations for engines. A leaf store: it knows nothing about
//! cars beyond what the foreign key enforces.
//!
//! ## Key Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_engine_by_id   SELECT                      → Option<Engine>        │
//! │  create_engine      tx: INSERT ... RETURNING    → Engine (new UUID)     │
//! │  update_engine      tx: UPDATE ... RETURNING    → Engine                │
//! │  delete_engine      tx: SELECT, DELETE, check rows_affected → Engine    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting an engine that cars still reference fails with
//! `DbError::ForeignKeyViolation` and leaves both tables untouched.

use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{begin_write, commit, decode_id, parse_id};
use crate::error::{DbError, DbResult};
use carzone_core::{Engine, EngineRequest};

const ENTITY: &str = "engine";

/// Raw `engine` row as SQLite returns it.
#[derive(Debug, FromRow)]
struct EngineRow {
    id: String,
    displacement: i64,
    no_of_cylinders: i64,
    car_range: i64,
}

impl EngineRow {
    fn into_engine(self) -> DbResult<Engine> {
        Ok(Engine {
            engine_id: decode_id(ENTITY, &self.id)?,
            displacement: self.displacement,
            no_of_cylinders: self.no_of_cylinders,
            car_range: self.car_range,
        })
    }
}

/// Loads one engine through any executor (pool or open transaction).
pub(crate) async fn fetch_engine<'e, E>(executor: E, engine_id: Uuid) -> DbResult<Option<Engine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<EngineRow> = sqlx::query_as(
        r#"
        SELECT id, displacement, no_of_cylinders, car_range
        FROM engine
        WHERE id = ?1
        "#,
    )
    .bind(engine_id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(EngineRow::into_engine).transpose()
}

/// Store for engine database operations.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.engines();
///
/// let engine = store.create_engine(&EngineRequest {
///     displacement: 2000,
///     no_of_cylinders: 4,
///     car_range: 600,
/// }).await?;
///
/// let found = store.get_engine_by_id(&engine.engine_id.to_string()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct EngineStore {
    pool: SqlitePool,
}

impl EngineStore {
    /// Creates a new EngineStore.
    pub fn new(pool: SqlitePool) -> Self {
        EngineStore { pool }
    }

    /// Gets an engine by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Engine))` - Engine found
    /// * `Ok(None)` - No engine with this ID
    /// * `Err(DbError::InvalidId)` - `id` is not a UUID
    pub async fn get_engine_by_id(&self, id: &str) -> DbResult<Option<Engine>> {
        let engine_id = parse_id(ENTITY, id)?;

        debug!(id = %engine_id, "Fetching engine");

        fetch_engine(&self.pool, engine_id).await
    }

    /// Creates an engine with a freshly generated UUID.
    ///
    /// The INSERT both writes and reads back the canonical row, inside a
    /// single transaction.
    pub async fn create_engine(&self, request: &EngineRequest) -> DbResult<Engine> {
        let engine_id = Uuid::new_v4();

        debug!(
            id = %engine_id,
            displacement = request.displacement,
            no_of_cylinders = request.no_of_cylinders,
            "Creating engine"
        );

        let mut tx = begin_write(&self.pool).await?;

        let row: EngineRow = sqlx::query_as(
            r#"
            INSERT INTO engine (id, displacement, no_of_cylinders, car_range)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, displacement, no_of_cylinders, car_range
            "#,
        )
        .bind(engine_id.to_string())
        .bind(request.displacement)
        .bind(request.no_of_cylinders)
        .bind(request.car_range)
        .fetch_one(&mut *tx)
        .await?;

        let created = row.into_engine()?;
        commit(tx).await?;

        Ok(created)
    }

    /// Replaces an engine's specs.
    ///
    /// ## Returns
    /// * `Ok(Engine)` - The row as stored after the update
    /// * `Err(DbError::InvalidId)` - `id` is not a UUID (no statement run)
    /// * `Err(DbError::NotFound)` - No engine with this ID
    pub async fn update_engine(&self, id: &str, request: &EngineRequest) -> DbResult<Engine> {
        let engine_id = parse_id(ENTITY, id)?;

        debug!(id = %engine_id, "Updating engine");

        let mut tx = begin_write(&self.pool).await?;

        let row: Option<EngineRow> = sqlx::query_as(
            r#"
            UPDATE engine
            SET displacement = ?2, no_of_cylinders = ?3, car_range = ?4
            WHERE id = ?1
            RETURNING id, displacement, no_of_cylinders, car_range
            "#,
        )
        .bind(engine_id.to_string())
        .bind(request.displacement)
        .bind(request.no_of_cylinders)
        .bind(request.car_range)
        .fetch_optional(&mut *tx)
        .await?;

        let updated = row
            .ok_or_else(|| DbError::not_found(ENTITY, id))?
            .into_engine()?;
        commit(tx).await?;

        Ok(updated)
    }

    /// Deletes an engine and returns what was deleted.
    ///
    /// ## Steps (one transaction)
    /// 1. SELECT the row → `NotFound` if absent
    /// 2. DELETE it → `ForeignKeyViolation` if cars still reference it
    /// 3. Zero affected rows → `NothingDeleted`
    ///
    /// Under isolation weaker than serializable a concurrent delete can land
    /// between steps 1 and 2; step 3 reports that case. The write lock taken
    /// at `BEGIN IMMEDIATE` keeps SQLite out of it.
    pub async fn delete_engine(&self, id: &str) -> DbResult<Engine> {
        let engine_id = parse_id(ENTITY, id)?;

        debug!(id = %engine_id, "Deleting engine");

        let mut tx = begin_write(&self.pool).await?;

        let deleted = match fetch_engine(&mut *tx, engine_id).await? {
            Some(engine) => engine,
            None => {
                warn!(id = %engine_id, "Engine to delete does not exist");
                return Err(DbError::not_found(ENTITY, id));
            }
        };

        let result = sqlx::query("DELETE FROM engine WHERE id = ?1")
            .bind(engine_id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NothingDeleted {
                entity: ENTITY.to_string(),
                id: id.to_string(),
            });
        }

        commit(tx).await?;

        Ok(deleted)
    }

    /// Counts stored engines (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM engine")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn store() -> EngineStore {
        Database::new(DbConfig::in_memory()).await.unwrap().engines()
    }

    fn request() -> EngineRequest {
        EngineRequest {
            displacement: 2000,
            no_of_cylinders: 4,
            car_range: 600,
        }
    }

    #[tokio::test]
    async fn test_create_engine_echoes_request() {
        let store = store().await;

        let engine = store.create_engine(&request()).await.unwrap();

        assert!(!engine.is_nil());
        assert_eq!(engine.displacement, 2000);
        assert_eq!(engine.no_of_cylinders, 4);
        assert_eq!(engine.car_range, 600);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_engine_generates_distinct_ids() {
        let store = store().await;

        let first = store.create_engine(&request()).await.unwrap();
        let second = store.create_engine(&request()).await.unwrap();

        assert_ne!(first.engine_id, second.engine_id);
    }

    #[tokio::test]
    async fn test_get_engine_by_id() {
        let store = store().await;
        let created = store.create_engine(&request()).await.unwrap();

        let found = store
            .get_engine_by_id(&created.engine_id.to_string())
            .await
            .unwrap();

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_get_missing_engine_is_none() {
        let store = store().await;

        let found = store
            .get_engine_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_engine_rejects_malformed_id() {
        let store = store().await;

        let err = store.get_engine_by_id("not-a-uuid").await.unwrap_err();

        assert!(matches!(err, DbError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_update_engine() {
        let store = store().await;
        let created = store.create_engine(&request()).await.unwrap();
        let id = created.engine_id.to_string();

        let updated = store
            .update_engine(
                &id,
                &EngineRequest {
                    displacement: 3000,
                    no_of_cylinders: 6,
                    car_range: 450,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.engine_id, created.engine_id);
        assert_eq!(updated.displacement, 3000);
        assert_eq!(updated.no_of_cylinders, 6);
        assert_eq!(updated.car_range, 450);
        assert_eq!(store.get_engine_by_id(&id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_engine_invalid_id() {
        let store = store().await;

        let err = store.update_engine("1234", &request()).await.unwrap_err();

        assert!(matches!(err, DbError::InvalidId { .. }));
        assert_eq!(err.to_string(), "invalid engine ID format: 1234");
    }

    #[tokio::test]
    async fn test_update_missing_engine_is_not_found() {
        let store = store().await;

        let err = store
            .update_engine(&Uuid::new_v4().to_string(), &request())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_engine() {
        let store = store().await;
        let created = store.create_engine(&request()).await.unwrap();
        let id = created.engine_id.to_string();

        let deleted = store.delete_engine(&id).await.unwrap();

        assert_eq!(deleted, created);
        assert!(store.get_engine_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_engine_leaves_store_unchanged() {
        let store = store().await;
        store.create_engine(&request()).await.unwrap();

        let err = store
            .delete_engine(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("engine not found"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_engine_invalid_id() {
        let store = store().await;

        let err = store.delete_engine("zzz").await.unwrap_err();

        assert!(matches!(err, DbError::InvalidId { .. }));
    }
}
