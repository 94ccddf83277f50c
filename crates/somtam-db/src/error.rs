//! # Store Errors
//!
//! Everything that can go wrong between a till command and `kv_state`.
//!
//! ```text
//! sqlx::Error ──┐
//! MigrateError ─┼──► DbError ──► ApiError { code: DATABASE_ERROR }
//! serde_json ───┘      (details logged by the terminal, not shown)
//! ```

use thiserror::Error;

/// Failures of the state store.
#[derive(Debug, Error)]
pub enum DbError {
    /// Row expected but absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The database file or its directory could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An embedded schema migration did not apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit of a transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored value could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - A state row was edited by hand into invalid JSON
    /// - A state row no longer matches the expected shape
    #[error("Stored value for '{key}' is unreadable: {reason}")]
    Serialization { key: String, reason: String },

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a Serialization error for a state key.
    pub fn serialization(key: impl Into<String>, err: impl ToString) -> Self {
        DbError::Serialization {
            key: key.into(),
            reason: err.to_string(),
        }
    }
}

/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
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

pub type DbResult<T> = Result<T, DbError>;
