//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Classes                                        │
//! │                                                                         │
//! │  (a) Input format      InvalidId, Validation                           │
//! │      Detected before any statement runs.                               │
//! │                                                                         │
//! │  (b) Referential       NotFound, NothingDeleted, ForeignKeyViolation   │
//! │      Detected by a pre-check query or a constraint.                    │
//! │                                                                         │
//! │  (c) Persistence       QueryFailed, ConnectionFailed, PoolExhausted,   │
//! │                        TransactionFailed, Internal, ...                │
//! │      Any other sqlx failure, categorised but never retried.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use carzone_core::ValidationError;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An identifier is not valid UUID syntax. No statement was executed.
    #[error("invalid {entity} ID format: {id}")]
    InvalidId { entity: String, id: String },

    /// The request failed a domain rule the store checks itself
    /// (currently only the fuel type spelling).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Creating a car whose engine does not exist
    /// - Updating or deleting an ID that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The delete statement matched no row although the pre-check found one.
    #[error("no {entity} deleted: {id}")]
    NothingDeleted { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting an engine that cars still reference
    /// - Updating a car to point at a non-existent engine
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A configuration value could not be parsed.
    #[error("Invalid configuration value for {0}")]
    InvalidConfig(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidId error.
    pub fn invalid_id(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::InvalidId {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (FK)    → DbError::ForeignKeyViolation
/// sqlx::Error::Database (other) → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut     → DbError::PoolExhausted
/// sqlx::Error::PoolClosed       → DbError::ConnectionFailed
/// Other                         → DbError::Internal
/// ```
///
/// Absent rows never arrive here: stores read with `fetch_optional` and
/// report `NotFound` with the entity and ID themselves.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if is_foreign_key_failure(&*db_err) => {
                DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                }
            }

            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLite reports `SQLITE_CONSTRAINT_FOREIGNKEY` only with extended result
/// codes on; the message is the same either way.
fn is_foreign_key_failure(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err.is_foreign_key_violation() || db_err.message().contains("FOREIGN KEY constraint failed")
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_entity_name() {
        assert_eq!(
            DbError::not_found("car", "abc").to_string(),
            "car not found: abc"
        );
        assert_eq!(
            DbError::invalid_id("engine", "xyz").to_string(),
            "invalid engine ID format: xyz"
        );
        let err = DbError::NothingDeleted {
            entity: "engine".to_string(),
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "no engine deleted: abc");
    }

    #[test]
    fn test_pool_errors_are_categorised() {
        let closed: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(closed, DbError::ConnectionFailed(_)));

        let timed_out: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(timed_out, DbError::PoolExhausted));

        // Stores never rely on fetch_one for lookups
        let missing: DbError = sqlx::Error::RowNotFound.into();
        assert!(!missing.is_not_found());
        assert!(matches!(missing, DbError::Internal(_)));
    }
}
