//! # Database Error Types
//!
//! Error types for storage operations, plus the sale engine's combined
//! error.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← categorized: unique / FK / CHECK / pool       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError ← Business(CoreError) | Db(DbError)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/server) ← 400 with message | 500 generic               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business failures travel as values. Any `Err` out of the engine means the
//! transaction was rolled back before the error was returned; there is no
//! partially-written sale to clean up.

use thiserror::Error;

use kasir_core::CoreError;

// =============================================================================
// DbError
// =============================================================================

/// Storage operation errors.
///
/// Wraps sqlx errors with enough categorization that callers can react to
/// constraint violations without string-matching SQLite messages themselves.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate SKU, duplicate sale number).
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation. The `stock >= 0` backstop surfaces here
    /// if a write ever bypasses the guarded decrement.
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded into its domain type.
    #[error("Corrupt column {column}: {message}")]
    CorruptColumn { column: String, message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True when this error is a unique violation on the given column
    /// (matched as `table.column` in SQLite's message).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field } if field.contains(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// EngineError
// =============================================================================

/// Combined error for sale engine operations.
///
/// Splits cashier-facing business failures (empty cart, short payment,
/// insufficient stock) from infrastructure failures so the HTTP layer can
/// map the former to 400 with the exact message and the latter to a generic
/// 500.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule rejected the operation. The message is safe to show
    /// to the cashier verbatim.
    #[error(transparent)]
    Business(#[from] CoreError),

    /// Storage failure. Logged server-side, never shown verbatim.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl EngineError {
    /// True for failures the cashier can act on.
    pub fn is_business(&self) -> bool {
        matches!(self, EngineError::Business(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Db(DbError::from(err))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_column_match() {
        let err = DbError::UniqueViolation {
            field: "sales.sale_number".to_string(),
        };
        assert!(err.is_unique_violation_on("sale_number"));
        assert!(!err.is_unique_violation_on("sku"));
    }

    #[test]
    fn engine_error_split() {
        let business: EngineError = CoreError::EmptyCart.into();
        assert!(business.is_business());
        assert_eq!(business.to_string(), "Cart is empty");

        let db: EngineError = DbError::PoolExhausted.into();
        assert!(!db.is_business());
    }
}
