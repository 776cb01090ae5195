//! # carzone-core: Domain Types for CarZone
//!
//! This crate holds the CarZone domain model (cars and their engines) and
//! the request validation that runs before anything reaches the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CarZone Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP handlers (outside workspace)               │   │
//! │  │    POST /cars ──► validate_car_request ──► CarStore::create_car │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ carzone-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌───────────────────┐  │   │
//! │  │   │     types     │  │  validation   │  │      error        │  │   │
//! │  │   │  Car, Engine  │  │  year, fuel,  │  │  ValidationError  │  │   │
//! │  │   │  FuelType     │  │  engine specs │  │                   │  │   │
//! │  │   └───────────────┘  └───────────────┘  └───────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 carzone-db (Persistence Layer)                  │   │
//! │  │          EngineStore, CarStore, migrations, transactions        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, Engine, requests, FuelType)
//! - [`error`] - Validation error type
//! - [`validation`] - Request validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use carzone_core::validation::validate_engine_request;
//! use carzone_core::EngineRequest;
//!
//! let request = EngineRequest {
//!     displacement: 2000,
//!     no_of_cylinders: 4,
//!     car_range: 600,
//! };
//! assert!(validate_engine_request(&request).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Earliest accepted model year.
///
/// 1886 is the year of the Benz Patent-Motorwagen; nothing older is a car.
pub const MIN_MODEL_YEAR: i32 = 1886;
