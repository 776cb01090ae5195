//! # Validation Module
//!
//! Request validation for CarZone. Handlers call these before invoking a
//! store; the stores themselves only re-check ID syntax.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Handler (deserialization)                                    │
//! │  └── Shape of the JSON body                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── name/brand non-empty, year 1886..=current year                    │
//! │  ├── fuel type in {Petrol, Diesel, Electric, Hybrid}                   │
//! │  └── engine specs positive, range/price non-negative                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── car.engine_id → engine.id foreign key                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use carzone_core::validation::{validate_year, validate_engine_request};
//! use carzone_core::EngineRequest;
//!
//! assert!(validate_year("2020").is_ok());
//! assert!(validate_year("1885").is_err());
//!
//! let bad = EngineRequest { displacement: 0, no_of_cylinders: 4, car_range: 600 };
//! assert!(validate_engine_request(&bad).is_err());
//! ```

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{CarRequest, Engine, EngineRequest};
use crate::MIN_MODEL_YEAR;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Validators
// =============================================================================

/// Validates an engine create/update body.
///
/// ## Rules
/// - `displacement` > 0
/// - `no_of_cylinders` > 0
/// - `car_range` >= 0
pub fn validate_engine_request(engine: &EngineRequest) -> ValidationResult<()> {
    validate_engine_specs(engine.displacement, engine.no_of_cylinders, engine.car_range)
}

/// Validates a car create/update body.
///
/// Checks run in a fixed order and the first failure wins:
/// name, year, brand, fuel type, engine, price.
///
/// ## Example
/// ```rust
/// use carzone_core::validation::validate_car_request;
/// use carzone_core::{CarRequest, Engine};
///
/// let request = CarRequest {
///     name: "Model X".to_string(),
///     brand: "Acme".to_string(),
///     year: "2020".to_string(),
///     engine: Engine {
///         engine_id: uuid::Uuid::new_v4(),
///         displacement: 2000,
///         no_of_cylinders: 4,
///         car_range: 600,
///     },
///     price: 25000.0,
///     fuel_type: "Petrol".to_string(),
/// };
/// assert!(validate_car_request(&request).is_ok());
/// ```
pub fn validate_car_request(car: &CarRequest) -> ValidationResult<()> {
    validate_name(&car.name)?;
    validate_year(&car.year)?;
    validate_brand(&car.brand)?;
    car.fuel_type()?;
    validate_engine(&car.engine)?;
    validate_price(car.price)?;
    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a car name (must not be empty).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }
    Ok(())
}

/// Validates a brand (must not be empty).
pub fn validate_brand(brand: &str) -> ValidationResult<()> {
    if brand.is_empty() {
        return Err(ValidationError::required("brand"));
    }
    Ok(())
}

/// Validates a model year given as text.
///
/// ## Rules
/// - Must not be empty
/// - Must parse as an integer
/// - Must be between 1886 and the current (UTC) calendar year, inclusive
pub fn validate_year(year: &str) -> ValidationResult<()> {
    if year.is_empty() {
        return Err(ValidationError::required("year"));
    }

    let value: i64 = year.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "year".to_string(),
        reason: "must be a valid number".to_string(),
    })?;

    let current_year = i64::from(Utc::now().year());
    let min_year = i64::from(MIN_MODEL_YEAR);
    if value < min_year || value > current_year {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: min_year,
            max: current_year,
        });
    }

    Ok(())
}

/// Validates the engine embedded in a car request.
///
/// Unlike [`validate_engine_request`] the engine must also carry an ID,
/// since a car can only reference an engine that already exists.
pub fn validate_engine(engine: &Engine) -> ValidationResult<()> {
    if engine.is_nil() {
        return Err(ValidationError::required("engine_id"));
    }
    validate_engine_specs(engine.displacement, engine.no_of_cylinders, engine.car_range)
}

/// Validates a price (zero allowed).
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if price < 0.0 {
        return Err(ValidationError::must_not_be_negative("price"));
    }
    Ok(())
}

fn validate_engine_specs(
    displacement: i64,
    no_of_cylinders: i64,
    car_range: i64,
) -> ValidationResult<()> {
    if displacement <= 0 {
        return Err(ValidationError::must_be_positive("displacement"));
    }
    if no_of_cylinders <= 0 {
        return Err(ValidationError::must_be_positive("no_of_cylinders"));
    }
    if car_range < 0 {
        return Err(ValidationError::must_not_be_negative("car_range"));
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Parses an identifier supplied as text.
///
/// ## Example
/// ```rust
/// use carzone_core::validation::parse_uuid;
///
/// assert!(parse_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(parse_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn parse_uuid(field: &str, id: &str) -> ValidationResult<Uuid> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
