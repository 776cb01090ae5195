//! Store writes from many tasks at once against a file database with a
//! multi-connection pool.

use carzone_core::{CarRequest, Engine, EngineRequest};
use carzone_db::{Database, DbConfig};
use tokio::task::JoinSet;

const WRITERS: usize = 100;

async fn file_database(dir: &tempfile::TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("carzone.db")).max_connections(8);
    Database::new(config).await.unwrap()
}

fn request(seed: usize, engine: &Engine) -> CarRequest {
    CarRequest {
        name: format!("Model {seed}"),
        brand: "Acme".to_string(),
        year: "2020".to_string(),
        engine: engine.clone(),
        price: 20000.0 + seed as f64,
        fuel_type: "Petrol".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_car_creates_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let engine = db
        .engines()
        .create_engine(&EngineRequest {
            displacement: 2000,
            no_of_cylinders: 4,
            car_range: 600,
        })
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for seed in 0..WRITERS {
        let cars = db.cars();
        let request = request(seed, &engine);
        tasks.spawn(async move { cars.create_car(&request).await });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined.unwrap() {
            failures.push(e.to_string());
        }
    }

    assert!(failures.is_empty(), "failed creates: {failures:?}");
    assert_eq!(db.cars().count().await.unwrap(), WRITERS as i64);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_and_engine_checks_do_not_lock_out() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let engine = db
        .engines()
        .create_engine(&EngineRequest {
            displacement: 1600,
            no_of_cylinders: 4,
            car_range: 700,
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    for seed in 0..WRITERS / 2 {
        let car = db.cars().create_car(&request(seed, &engine)).await.unwrap();
        ids.push(car.id.to_string());
    }

    // Deletes of existing cars interleaved with creates of new ones
    let mut tasks = JoinSet::new();
    for (seed, id) in ids.into_iter().enumerate() {
        let cars = db.cars();
        tasks.spawn(async move { cars.delete_car(&id).await.map(|_| ()) });

        let cars = db.cars();
        let request = request(WRITERS + seed, &engine);
        tasks.spawn(async move { cars.create_car(&request).await.map(|_| ()) });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined.unwrap() {
            failures.push(e.to_string());
        }
    }

    assert!(failures.is_empty(), "failed writes: {failures:?}");
    assert_eq!(db.cars().count().await.unwrap(), (WRITERS / 2) as i64);

    db.close().await;
}
