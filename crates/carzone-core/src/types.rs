//! # Domain Types
//!
//! Core domain types used throughout CarZone.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────┐               │
//! │  │        Car          │          │       Engine        │               │
//! │  │  ─────────────────  │ engine_id│  ─────────────────  │               │
//! │  │  id (UUID)          │─────────►│  engine_id (UUID)   │               │
//! │  │  name, brand, year  │          │  displacement       │               │
//! │  │  price, fuel_type   │          │  no_of_cylinders    │               │
//! │  │  created_at         │          │  car_range          │               │
//! │  │  updated_at         │          └─────────────────────┘               │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! │  CarRequest / EngineRequest: what callers send (no server fields)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every type serializes with the same keys as the HTTP representation:
//! `id, name, brand, year, engine, price, fuel_type, created_at, updated_at`
//! and `engine_id, displacement, no_of_cylinders, car_range` for engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

// =============================================================================
// Fuel Type
// =============================================================================

/// Propulsion type of a car. Stored as its variant name (`"Petrol"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    /// All accepted fuel types, in display order.
    pub const ALL: [FuelType; 4] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
    ];

    /// Returns the canonical spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: `"petrol"` is rejected just like `"Steam"`.
impl FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "fuel type".to_string(),
                allowed: FuelType::ALL.iter().map(|f| f.to_string()).collect(),
            })
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A powertrain specification referenced by cars.
///
/// `Default` is the zero engine: nil ID and zeroed specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    /// Unique identifier (UUID v4), immutable once created.
    pub engine_id: Uuid,

    /// Displacement in cubic centimetres (or equivalent).
    pub displacement: i64,

    /// Number of cylinders.
    pub no_of_cylinders: i64,

    /// Range in kilometres on a full tank or charge.
    pub car_range: i64,
}

impl Engine {
    /// An engine known only by its ID, all specs zeroed.
    ///
    /// This is what a car carries when it was loaded without joining the
    /// engine table.
    pub fn reference(engine_id: Uuid) -> Self {
        Engine {
            engine_id,
            ..Engine::default()
        }
    }

    /// True for the zero value (nil ID).
    pub fn is_nil(&self) -> bool {
        self.engine_id.is_nil()
    }
}

/// Body of a create/update engine call. The ID is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub displacement: i64,
    pub no_of_cylinders: i64,
    pub car_range: i64,
}

impl From<&Engine> for EngineRequest {
    fn from(engine: &Engine) -> Self {
        EngineRequest {
            displacement: engine.displacement,
            no_of_cylinders: engine.no_of_cylinders,
            car_range: engine.car_range,
        }
    }
}

// =============================================================================
// Car
// =============================================================================

/// A vehicle listing. Embeds its engine, linked through `engine.engine_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier (UUID v4), immutable once created.
    pub id: Uuid,

    pub name: String,

    pub brand: String,

    /// Model year, kept as text exactly as submitted (e.g. `"2020"`).
    pub year: String,

    /// The referenced engine. Only `engine_id` is guaranteed to be filled;
    /// the specs are present when the engine table was joined.
    pub engine: Engine,

    pub price: f64,

    pub fuel_type: FuelType,

    /// Set once on insert, never changed.
    pub created_at: DateTime<Utc>,

    /// Refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

/// Body of a create/update car call.
///
/// `fuel_type` stays free text so an unknown value reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRequest {
    pub name: String,
    pub brand: String,
    pub year: String,
    pub engine: Engine,
    pub price: f64,
    pub fuel_type: String,
}

impl CarRequest {
    /// Parses `fuel_type` into the enum.
    pub fn fuel_type(&self) -> Result<FuelType, ValidationError> {
        self.fuel_type.parse()
    }
}

impl From<&Car> for CarRequest {
    fn from(car: &Car) -> Self {
        CarRequest {
            name: car.name.clone(),
            brand: car.brand.clone(),
            year: car.year.clone(),
            engine: car.engine.clone(),
            price: car.price,
            fuel_type: car.fuel_type.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
