//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Categorized: connectivity / query / decode /  │
//! │       │                  constraint / transaction                      │
//! │       ▼                                                                 │
//! │  DbError::Operation ← Tagged with the operation name                   │
//! │       │               ("create_receipt: insert receipt line 2: ...")   │
//! │       ▼                                                                 │
//! │  ApiError (in apps/api) ← Logged, then a fixed 500 body                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate value violates {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Receipt references a non-existent employee or loyalty card
    /// - Line item references a non-existent product
    /// - Deleting an employee who still has receipts
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// NOT NULL or CHECK constraint violation.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// A computed amount does not fit the decimal range.
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),

    /// Database unreachable or connection refused.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row could not be decoded into the expected record.
    #[error("Row decode failed: {0}")]
    Decode(String),

    /// BEGIN / COMMIT failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use until acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal error (task panicked, invariant broken).
    #[error("Internal database error: {0}")]
    Internal(String),

    /// Any of the above, tagged with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<DbError>,
    },
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Wraps this error with the name of the failing operation.
    pub fn in_operation(self, operation: impl Into<String>) -> Self {
        DbError::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping operation tags.
    pub fn root(&self) -> &DbError {
        match self {
            DbError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the store rejected the write because of a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self.root(),
            DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::ConstraintViolation { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound       → DbError::NotFound
/// sqlx::Error::Database          → classified by constraint kind
/// sqlx::Error::ColumnDecode etc. → DbError::Decode
/// sqlx::Error::Io / Tls          → DbError::ConnectionFailed
/// sqlx::Error::PoolTimedOut      → DbError::PoolExhausted
/// Other                          → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();

                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation { constraint },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                        DbError::ConstraintViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => DbError::Decode(err.to_string()),

            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
                DbError::ConnectionFailed(err.to_string())
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Attaches an operation name to the error side of a result.
///
/// ```rust,ignore
/// sqlx::query("...").execute(&pool).await.operation("delete_employee")?;
/// ```
pub trait OperationExt<T> {
    fn operation(self, operation: &str) -> DbResult<T>;
}

impl<T, E: Into<DbError>> OperationExt<T> for Result<T, E> {
    fn operation(self, operation: &str) -> DbResult<T> {
        self.map_err(|err| err.into().in_operation(operation))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_tag_in_message() {
        let err = DbError::ForeignKeyViolation {
            message: "product 99 missing".to_string(),
        }
        .in_operation("insert receipt line 1")
        .in_operation("create_receipt");

        assert_eq!(
            err.to_string(),
            "create_receipt: insert receipt line 1: Foreign key violation: product 99 missing"
        );
        assert!(err.is_constraint_violation());
        assert!(matches!(err.root(), DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_sqlx_mapping() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::ColumnNotFound("total_amount".to_string())),
            DbError::Decode(_)
        ));
    }

    #[test]
    fn test_amount_overflow_message() {
        let err = DbError::AmountOverflow("receipt total".to_string())
            .in_operation("compute header total")
            .in_operation("create_receipt");

        assert_eq!(
            err.to_string(),
            "create_receipt: compute header total: Amount out of range: receipt total"
        );
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn test_operation_ext() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::PoolClosed);
        let err = result.operation("list_suppliers").unwrap_err();
        assert!(err.to_string().starts_with("list_suppliers: "));
        assert!(!err.is_constraint_violation());
    }
}
