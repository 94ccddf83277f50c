//! # API Error Type
//!
//! Unified error type for till commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Somtam POS                             │
//! │                                                                         │
//! │  {"cmd":"hold"}                                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Core error? ──── CoreError::EmptyCart ─────────┐               │  │
//! │  │         │                                       │               │  │
//! │  │         ▼                                       ▼               │  │
//! │  │  Store error? ─── DbError::TransactionFailed ── ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"ok":false,"error":{"code":"EMPTY_CART","message":"Cart is empty"}}   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Presentation switches on `code`; `message` is for logs and fallbacks.

use serde::Serialize;
use somtam_core::CoreError;
use somtam_db::DbError;

/// Error returned from till commands.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "prep ticket not found: P2603011900..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Hold, confirm or finalize on a cart with no lines
    EmptyCart,

    /// Retrieve with nothing parked
    NoHeldBills,

    /// Unknown ticket, held bill, receipt, menu item or line index
    NotFound,

    /// Negative or unreadable amount
    InvalidAmount,

    /// Input validation failed
    ValidationError,

    /// Payment command without an open payment
    PaymentError,

    /// Database operation failed
    DatabaseError,

    /// Request could not be parsed
    BadRequest,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::NoHeldBills => ErrorCode::NoHeldBills,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::NoOpenPayment => ErrorCode::PaymentError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, message)
    }
}

/// Converts database errors to API errors.
///
/// Details are logged; presentation gets a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::Serialization { key, reason } => {
                tracing::error!(key = %key, "Stored value unreadable: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Stored till state is unreadable")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for command handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        assert_eq!(ApiError::from(CoreError::EmptyCart).code, ErrorCode::EmptyCart);
        assert_eq!(
            ApiError::from(CoreError::NoHeldBills).code,
            ErrorCode::NoHeldBills
        );
        assert_eq!(
            ApiError::from(CoreError::invalid_amount("received", "must not be negative")).code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            ApiError::from(CoreError::NoOpenPayment).code,
            ErrorCode::PaymentError
        );
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::not_found("held bill", "H1"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["message"], "held bill not found: H1");
    }

    #[test]
    fn test_db_error_hides_details() {
        let err = ApiError::from(DbError::QueryFailed("no such table: kv_state".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("kv_state"));
    }
}
