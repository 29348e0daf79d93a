//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError / ValidationError          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄── InvalidQuery / InvalidEntity                 │
//! │       │                                                                 │
//! │       │  inside a transaction: TransactionFailed(Box<cause>)            │
//! │       ▼                                                                 │
//! │  API layer (outside this workspace) maps kinds to status classes        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is a fresh value built at the failure site.

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Lookup by id returned no row
    /// - A write that must touch a row affected zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity failed validation before reaching SQL.
    #[error("Invalid entity: {0}")]
    InvalidEntity(#[from] ValidationError),

    /// Filter, sort or page parameters could not be compiled.
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] CoreError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate username or email
    /// - Second stock row for the same product and storage
    #[error("Duplicate {field}: value already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent product_id or storage_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be opened or created
    /// - Pool has been closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A statement inside a transaction failed; the transaction was
    /// rolled back before this error was returned.
    #[error("Transaction failed and was rolled back: {0}")]
    TransactionFailed(Box<DbError>),

    /// The request deadline passed.
    #[error("Deadline exceeded during {stage}")]
    Timeout { stage: String },

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

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

    /// Creates a UniqueViolation error for the offending column(s).
    pub fn duplicate(field: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
        }
    }

    pub fn timeout(stage: impl Into<String>) -> Self {
        DbError::Timeout {
            stage: stage.into(),
        }
    }

    /// Wraps `cause` as a rolled-back transaction failure.
    pub fn transaction_failed(cause: DbError) -> Self {
        DbError::TransactionFailed(Box::new(cause))
    }

    /// The innermost error, looking through `TransactionFailed`.
    pub fn root_cause(&self) -> &DbError {
        match self {
            DbError::TransactionFailed(inner) => inner.root_cause(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DbError::Timeout { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed/Io  → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraints as:
                //   "UNIQUE constraint failed: <table>.<column>[, ...]"
                //   "FOREIGN KEY constraint failed"
                if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = columns
                        .split(", ")
                        .map(|column| column.rsplit('.').next().unwrap_or(column))
                        .collect::<Vec<_>>()
                        .join(", ");
                    DbError::duplicate(field)
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Configuration(e) => DbError::ConnectionFailed(e.to_string()),

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
