//! # Database Errors
//!
//! ## Error Flow
//! ```text
//! sqlx::Error / MigrateError
//!      │
//!      ▼
//! DbError (this module)
//!   ├── NotFound / UniqueViolation / ForeignKeyViolation / CheckViolation
//!   └── ConnectionFailed / PoolExhausted / QueryFailed / ...
//!      │
//!      ▼
//! ApiError (apps/orderdesk): code + message for the caller
//! ```

use thiserror::Error;

/// Failures of database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write (customer email).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A foreign key rejected the write.
    ///
    /// Raised for an order whose customer does not exist, and for deleting a
    /// customer that still has orders (`ON DELETE RESTRICT`).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the write, e.g. `price_cents > 0`.
    #[error("Check constraint failed: {0}")]
    CheckViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other error reported by SQLite.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Commit of a multi-statement write failed; nothing was stored.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Classifies a SQLite error message by the constraint that failed.
    ///
    /// SQLite reports constraints as:
    /// - `UNIQUE constraint failed: customers.email`
    /// - `FOREIGN KEY constraint failed`
    /// - `CHECK constraint failed: price_cents > 0`
    fn from_sqlite_message(message: &str) -> Self {
        if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
            let field = column.rsplit('.').next().unwrap_or(column);
            return DbError::UniqueViolation {
                field: field.to_string(),
                value: String::new(),
            };
        }

        if message.starts_with("FOREIGN KEY constraint failed") {
            return DbError::ForeignKeyViolation {
                message: message.to_string(),
            };
        }

        if message.starts_with("CHECK constraint failed") {
            return DbError::CheckViolation(message.to_string());
        }

        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => {
                DbError::ConnectionFailed("connection pool is closed".to_string())
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let err = DbError::not_found("Customer", "abc");
        assert_eq!(err.to_string(), "Customer not found: abc");

        let err = DbError::duplicate("email", "ana@example.com");
        assert_eq!(
            err.to_string(),
            "Duplicate email: 'ana@example.com' already exists"
        );
    }

    #[test]
    fn test_constraint_messages() {
        let err = DbError::from_sqlite_message("UNIQUE constraint failed: customers.email");
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));

        let err = DbError::from_sqlite_message("FOREIGN KEY constraint failed");
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err = DbError::from_sqlite_message("CHECK constraint failed: price_cents > 0");
        assert!(matches!(err, DbError::CheckViolation(_)));

        let err = DbError::from_sqlite_message("no such table: invoices");
        assert!(matches!(err, DbError::QueryFailed(_)));
    }

    #[test]
    fn test_sqlx_error_mapping() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));

        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
