//! # Car Store
//!
//! Database operations for cars. Reads join the engine table so callers get
//! the embedded engine specs in one round trip.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_car (single transaction)                      │
//! │                                                                         │
//! │  CarRequest { engine.engine_id = E, ... }                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM engine WHERE id = E ──── no row ──► NotFound(engine)  │
//! │       │                                              (ROLLBACK)         │
//! │       ▼                                                                 │
//! │  INSERT INTO car ... RETURNING ...                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT → Car { engine: <specs of E>, created_at == updated_at }       │
//! │                                                                         │
//! │  The check and the insert share the transaction, and the schema's      │
//! │  foreign key rejects a dangling engine_id regardless.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Brand Lookup
//! `get_car_by_brand(brand, include_engine)`:
//! - `true`  → LEFT JOIN engine, embedded specs populated
//! - `false` → car columns only; `engine.engine_id` is still filled from
//!   `car.engine_id`, the specs stay zero

use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::engine::fetch_engine;
use super::{begin_write, commit, decode_id, parse_id};
use crate::error::{DbError, DbResult};
use carzone_core::{Car, CarRequest, Engine, FuelType};

const ENTITY: &str = "car";

/// Raw `car` row, optionally joined with its engine's specs.
///
/// Engine columns are absent from non-joined queries, hence `default`.
#[derive(Debug, FromRow)]
struct CarRow {
    id: String,
    name: String,
    brand: String,
    year: String,
    engine_id: String,
    price: f64,
    fuel_type: FuelType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(default)]
    displacement: Option<i64>,
    #[sqlx(default)]
    no_of_cylinders: Option<i64>,
    #[sqlx(default)]
    car_range: Option<i64>,
}

impl CarRow {
    fn into_car(self) -> DbResult<Car> {
        let engine = Engine {
            engine_id: decode_id("engine", &self.engine_id)?,
            displacement: self.displacement.unwrap_or_default(),
            no_of_cylinders: self.no_of_cylinders.unwrap_or_default(),
            car_range: self.car_range.unwrap_or_default(),
        };

        Ok(Car {
            id: decode_id(ENTITY, &self.id)?,
            name: self.name,
            brand: self.brand,
            year: self.year,
            engine,
            price: self.price,
            fuel_type: self.fuel_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Loads one car joined with its engine through any executor.
async fn fetch_car<'e, E>(executor: E, car_id: Uuid) -> DbResult<Option<Car>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<CarRow> = sqlx::query_as(
        r#"
        SELECT
            c.id, c.name, c.brand, c.year, c.engine_id, c.price, c.fuel_type,
            c.created_at, c.updated_at,
            e.displacement, e.no_of_cylinders, e.car_range
        FROM car c
        LEFT JOIN engine e ON c.engine_id = e.id
        WHERE c.id = ?1
        "#,
    )
    .bind(car_id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(CarRow::into_car).transpose()
}

/// Store for car database operations.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.cars();
///
/// let car = store.create_car(&request).await?;
/// let acme = store.get_car_by_brand("Acme", true).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CarStore {
    pool: SqlitePool,
}

impl CarStore {
    /// Creates a new CarStore.
    pub fn new(pool: SqlitePool) -> Self {
        CarStore { pool }
    }

    /// Gets a car by its ID, with engine specs joined in.
    ///
    /// ## Returns
    /// * `Ok(Some(Car))` - Car found
    /// * `Ok(None)` - No car with this ID
    /// * `Err(DbError::InvalidId)` - `id` is not a UUID
    pub async fn get_car_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let car_id = parse_id(ENTITY, id)?;

        debug!(id = %car_id, "Fetching car");

        fetch_car(&self.pool, car_id).await
    }

    /// Lists every car of a brand. Returns an empty vector when none match.
    ///
    /// ## Arguments
    /// * `brand` - Exact brand name
    /// * `include_engine` - Join the engine table and fill in the specs
    pub async fn get_car_by_brand(&self, brand: &str, include_engine: bool) -> DbResult<Vec<Car>> {
        debug!(brand = %brand, include_engine, "Fetching cars by brand");

        let query = if include_engine {
            r#"
            SELECT
                c.id, c.name, c.brand, c.year, c.engine_id, c.price, c.fuel_type,
                c.created_at, c.updated_at,
                e.displacement, e.no_of_cylinders, e.car_range
            FROM car c
            LEFT JOIN engine e ON c.engine_id = e.id
            WHERE c.brand = ?1
            ORDER BY c.created_at, c.id
            "#
        } else {
            r#"
            SELECT id, name, brand, year, engine_id, price, fuel_type, created_at, updated_at
            FROM car
            WHERE brand = ?1
            ORDER BY created_at, id
            "#
        };

        let rows: Vec<CarRow> = sqlx::query_as(query)
            .bind(brand)
            .fetch_all(&self.pool)
            .await?;

        let cars = rows
            .into_iter()
            .map(CarRow::into_car)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = cars.len(), "Brand lookup returned cars");
        Ok(cars)
    }

    /// Creates a car referencing an existing engine.
    ///
    /// ## Returns
    /// * `Ok(Car)` - Stored car, engine specs filled from the engine table
    /// * `Err(DbError::Validation)` - Unknown fuel type
    /// * `Err(DbError::NotFound)` - `request.engine.engine_id` does not exist;
    ///   nothing is inserted
    pub async fn create_car(&self, request: &CarRequest) -> DbResult<Car> {
        let fuel_type = request.fuel_type()?;
        let car_id = Uuid::new_v4();
        let engine_id = request.engine.engine_id;
        let now = Utc::now();

        debug!(id = %car_id, engine_id = %engine_id, brand = %request.brand, "Creating car");

        let mut tx = begin_write(&self.pool).await?;

        let engine = match fetch_engine(&mut *tx, engine_id).await? {
            Some(engine) => engine,
            None => {
                warn!(engine_id = %engine_id, "Car references unknown engine");
                return Err(DbError::not_found("engine", engine_id.to_string()));
            }
        };

        let row: CarRow = sqlx::query_as(
            r#"
            INSERT INTO car (
                id, name, brand, year, engine_id,
                price, fuel_type, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9
            )
            RETURNING id, name, brand, year, engine_id, price, fuel_type, created_at, updated_at
            "#,
        )
        .bind(car_id.to_string())
        .bind(&request.name)
        .bind(&request.brand)
        .bind(&request.year)
        .bind(engine_id.to_string())
        .bind(request.price)
        .bind(fuel_type)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut created = row.into_car()?;
        created.engine = engine;
        commit(tx).await?;

        Ok(created)
    }

    /// Replaces every mutable field of a car and refreshes `updated_at`.
    /// `created_at` is never touched.
    ///
    /// ## Returns
    /// * `Ok(Car)` - The car as stored, engine specs joined in
    /// * `Err(DbError::InvalidId)` - `id` is not a UUID (no statement run)
    /// * `Err(DbError::NotFound)` - No car with this ID
    /// * `Err(DbError::ForeignKeyViolation)` - The new engine does not exist
    pub async fn update_car(&self, id: &str, request: &CarRequest) -> DbResult<Car> {
        let car_id = parse_id(ENTITY, id)?;
        let fuel_type = request.fuel_type()?;
        let engine_id = request.engine.engine_id;

        debug!(id = %car_id, engine_id = %engine_id, "Updating car");

        let mut tx = begin_write(&self.pool).await?;

        let row: Option<CarRow> = sqlx::query_as(
            r#"
            UPDATE car SET
                name = ?2,
                brand = ?3,
                year = ?4,
                engine_id = ?5,
                price = ?6,
                fuel_type = ?7,
                updated_at = ?8
            WHERE id = ?1
            RETURNING id, name, brand, year, engine_id, price, fuel_type, created_at, updated_at
            "#,
        )
        .bind(car_id.to_string())
        .bind(&request.name)
        .bind(&request.brand)
        .bind(&request.year)
        .bind(engine_id.to_string())
        .bind(request.price)
        .bind(fuel_type)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let mut updated = row
            .ok_or_else(|| DbError::not_found(ENTITY, id))?
            .into_car()?;

        if let Some(engine) = fetch_engine(&mut *tx, engine_id).await? {
            updated.engine = engine;
        }

        commit(tx).await?;

        Ok(updated)
    }

    /// Deletes a car and returns what was deleted.
    ///
    /// ## Steps (one transaction)
    /// 1. SELECT the car (joined) → `NotFound` if absent
    /// 2. DELETE it
    /// 3. Zero affected rows → `NotFound`
    ///
    /// Under isolation weaker than serializable a concurrent delete can land
    /// between steps 1 and 2; step 3 reports that case. The write lock taken
    /// at `BEGIN IMMEDIATE` keeps SQLite out of it.
    pub async fn delete_car(&self, id: &str) -> DbResult<Car> {
        let car_id = parse_id(ENTITY, id)?;

        debug!(id = %car_id, "Deleting car");

        let mut tx = begin_write(&self.pool).await?;

        let deleted = match fetch_car(&mut *tx, car_id).await? {
            Some(car) => car,
            None => {
                warn!(id = %car_id, "Car to delete does not exist");
                return Err(DbError::not_found(ENTITY, id));
            }
        };

        let result = sqlx::query("DELETE FROM car WHERE id = ?1")
            .bind(car_id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        commit(tx).await?;

        Ok(deleted)
    }

    /// Counts stored cars (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM car")
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
    use carzone_core::EngineRequest;

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn engine(db: &Database) -> Engine {
        db.engines()
            .create_engine(&EngineRequest {
                displacement: 2000,
                no_of_cylinders: 4,
                car_range: 600,
            })
            .await
            .unwrap()
    }

    fn request(name: &str, brand: &str, engine: &Engine) -> CarRequest {
        CarRequest {
            name: name.to_string(),
            brand: brand.to_string(),
            year: "2020".to_string(),
            engine: engine.clone(),
            price: 25000.0,
            fuel_type: "Petrol".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_car_embeds_engine() {
        let db = database().await;
        let engine = engine(&db).await;

        let car = db
            .cars()
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        assert!(!car.id.is_nil());
        assert_eq!(car.name, "Model X");
        assert_eq!(car.fuel_type, FuelType::Petrol);
        assert_eq!(car.engine, engine);
        assert_eq!(car.created_at, car.updated_at);
    }

    #[tokio::test]
    async fn test_create_car_uses_stored_engine_specs() {
        let db = database().await;
        let engine = engine(&db).await;
        let mut stale = engine.clone();
        stale.displacement = 9999;

        let car = db
            .cars()
            .create_car(&request("Model X", "Acme", &stale))
            .await
            .unwrap();

        assert_eq!(car.engine.displacement, 2000);
    }

    #[tokio::test]
    async fn test_create_car_unknown_engine() {
        let db = database().await;
        let ghost = Engine {
            engine_id: Uuid::new_v4(),
            displacement: 2000,
            no_of_cylinders: 4,
            car_range: 600,
        };

        let err = db
            .cars()
            .create_car(&request("Model X", "Acme", &ghost))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("engine not found"));
        assert_eq!(db.cars().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_car_unknown_fuel_type() {
        let db = database().await;
        let engine = engine(&db).await;
        let mut req = request("Model X", "Acme", &engine);
        req.fuel_type = "Steam".to_string();

        let err = db.cars().create_car(&req).await.unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.cars().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let db = database().await;
        let engine = engine(&db).await;
        let created = db
            .cars()
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        let found = db
            .cars()
            .get_car_by_id(&created.id.to_string())
            .await
            .unwrap();

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_get_missing_car_is_none() {
        let db = database().await;

        let found = db
            .cars()
            .get_car_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_car_by_brand_with_engine() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        cars.create_car(&request("Model X", "Acme", &engine)).await.unwrap();
        cars.create_car(&request("Model Y", "Acme", &engine)).await.unwrap();
        cars.create_car(&request("Roadster", "Other", &engine)).await.unwrap();

        let acme = cars.get_car_by_brand("Acme", true).await.unwrap();

        assert_eq!(acme.len(), 2);
        for car in &acme {
            assert_eq!(car.brand, "Acme");
            assert_eq!(car.engine, engine);
        }
    }

    #[tokio::test]
    async fn test_get_car_by_brand_without_engine_keeps_engine_id() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        cars.create_car(&request("Model X", "Acme", &engine)).await.unwrap();
        cars.create_car(&request("Model Y", "Acme", &engine)).await.unwrap();

        let joined = cars.get_car_by_brand("Acme", true).await.unwrap();
        let bare = cars.get_car_by_brand("Acme", false).await.unwrap();

        let joined_ids: Vec<Uuid> = joined.iter().map(|c| c.id).collect();
        let bare_ids: Vec<Uuid> = bare.iter().map(|c| c.id).collect();
        assert_eq!(joined_ids, bare_ids);

        for car in &bare {
            assert_eq!(car.engine, Engine::reference(engine.engine_id));
        }
    }

    #[tokio::test]
    async fn test_get_car_by_brand_no_match_is_empty() {
        let db = database().await;

        let cars = db.cars().get_car_by_brand("Nobody", true).await.unwrap();

        assert!(cars.is_empty());
    }

    #[tokio::test]
    async fn test_update_car_preserves_created_at() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        let created = cars
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let mut changes = request("Model X", "Acme", &engine);
        changes.price = 26000.0;
        changes.fuel_type = "Hybrid".to_string();
        let updated = cars
            .update_car(&created.id.to_string(), &changes)
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 26000.0);
        assert_eq!(updated.fuel_type, FuelType::Hybrid);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(updated.engine, engine);
    }

    #[tokio::test]
    async fn test_update_car_invalid_id() {
        let db = database().await;
        let engine = engine(&db).await;

        let err = db
            .cars()
            .update_car("car-1", &request("Model X", "Acme", &engine))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid car ID format: car-1");
    }

    #[tokio::test]
    async fn test_update_missing_car_is_not_found() {
        let db = database().await;
        let engine = engine(&db).await;

        let err = db
            .cars()
            .update_car(
                &Uuid::new_v4().to_string(),
                &request("Model X", "Acme", &engine),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_car_to_unknown_engine_rolls_back() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        let created = cars
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        let ghost = Engine::reference(Uuid::new_v4());
        let err = cars
            .update_car(&created.id.to_string(), &request("Renamed", "Acme", &ghost))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        let stored = cars
            .get_car_by_id(&created.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_delete_car_once() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        let created = cars
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();
        let id = created.id.to_string();

        let deleted = cars.delete_car(&id).await.unwrap();
        assert_eq!(deleted, created);

        let err = cars.delete_car(&id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("car not found"));
    }

    #[tokio::test]
    async fn test_delete_missing_car_leaves_store_unchanged() {
        let db = database().await;
        let engine = engine(&db).await;
        let cars = db.cars();
        let kept = cars
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        let err = cars
            .delete_car(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("car not found"));
        assert_eq!(cars.count().await.unwrap(), 1);
        assert_eq!(
            cars.get_car_by_id(&kept.id.to_string()).await.unwrap(),
            Some(kept)
        );
    }

    #[tokio::test]
    async fn test_delete_car_invalid_id() {
        let db = database().await;

        let err = db.cars().delete_car("nope").await.unwrap_err();

        assert!(matches!(err, DbError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_referenced_engine_cannot_be_deleted() {
        let db = database().await;
        let engine = engine(&db).await;
        db.cars()
            .create_car(&request("Model X", "Acme", &engine))
            .await
            .unwrap();

        let err = db
            .engines()
            .delete_engine(&engine.engine_id.to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.engines().count().await.unwrap(), 1);
    }
}
