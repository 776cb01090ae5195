//! # Seed Data Generator
//!
//! Populates the database with engines and cars for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 cars (default)
//! cargo run -p carzone-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p carzone-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p carzone-db --bin seed -- --db ./data/carzone.db
//! ```
//!
//! Each car gets its own engine. Log verbosity follows `RUST_LOG`.

use std::env;

use carzone_core::validation::{validate_car_request, validate_engine_request};
use carzone_core::{CarRequest, Engine, EngineRequest, FuelType};
use carzone_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Brands and their model names.
const CATALOGUE: &[(&str, &[&str])] = &[
    ("Acme", &["Model X", "Model Y", "Roadster", "Hauler"]),
    ("Velo", &["Sprint", "Tourer", "City"]),
    ("Nordwind", &["Fjord", "Tundra", "Aurora", "Polar"]),
    ("Kestrel", &["Swift", "Glide"]),
];

/// (displacement cc, cylinders, range km)
const ENGINES: &[(i64, i64, i64)] = &[
    (1200, 3, 650),
    (1600, 4, 700),
    (2000, 4, 600),
    (3000, 6, 500),
    (1500, 3, 900),
];

const DEFAULT_COUNT: usize = 50;
const DEFAULT_DB_PATH: &str = "./carzone_dev.db";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("CarZone Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of cars to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("CarZone Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Cars:     {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cars().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cars", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating cars...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let engine_request = generate_engine(seed);
        if let Err(e) = validate_engine_request(&engine_request) {
            warn!(seed, error = %e, "Skipping invalid engine");
            continue;
        }

        let engine = match db.engines().create_engine(&engine_request).await {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Failed to insert engine #{}: {}", seed, e);
                continue;
            }
        };

        let car_request = generate_car(seed, engine);
        if let Err(e) = validate_car_request(&car_request) {
            warn!(seed, error = %e, "Skipping invalid car");
            continue;
        }

        if let Err(e) = db.cars().create_car(&car_request).await {
            eprintln!("Failed to insert {} {}: {}", car_request.brand, car_request.name, e);
            continue;
        }

        generated += 1;

        if generated % 25 == 0 {
            println!("  Generated {} cars...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} cars in {:?}", generated, elapsed);
    let engines = db.engines().count().await?;
    info!(generated, engines, "Seed finished");

    println!();
    println!("Cars per brand:");
    for (brand, _) in CATALOGUE {
        let cars = db.cars().get_car_by_brand(brand, true).await?;
        println!("  {:<10} {}", brand, cars.len());
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,carzone_db=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn generate_engine(seed: usize) -> EngineRequest {
    let (displacement, no_of_cylinders, car_range) = ENGINES[seed % ENGINES.len()];

    EngineRequest {
        displacement,
        no_of_cylinders,
        car_range,
    }
}

fn generate_car(seed: usize, engine: Engine) -> CarRequest {
    let (brand, models) = CATALOGUE[seed % CATALOGUE.len()];
    let name = models[(seed / CATALOGUE.len()) % models.len()];
    let fuel_type = FuelType::ALL[(seed / 3) % FuelType::ALL.len()];

    CarRequest {
        name: name.to_string(),
        brand: brand.to_string(),
        year: (2005 + (seed % 20)).to_string(),
        engine,
        price: 15000.0 + ((seed * 1373) % 40000) as f64,
        fuel_type: fuel_type.to_string(),
    }
}
