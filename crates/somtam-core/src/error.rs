//! # Error Types
//!
//! Domain-specific error types for somtam-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  somtam-core errors (this file)                                        │
//! │  ├── CoreError        - Transaction engine failures                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  somtam-db errors (separate crate)                                     │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What presentation sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Presentation           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Guarantee
//! Every operation that returns `Err` leaves its state exactly as it found
//! it. Callers may correct the input and retry.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Transaction engine errors.
///
/// None of these are fatal; presentation maps each kind to a message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Hold or confirm was attempted on a cart with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Retrieve was attempted with an empty park stack.
    #[error("No held bills to retrieve")]
    NoHeldBills,

    /// A ticket id, held-bill id, receipt id, menu item or line index
    /// does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A quantity or monetary amount is not a usable non-negative number.
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// A payment operation was issued while no payment intake is open.
    #[error("No payment is open")]
    NoOpenPayment,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// InvalidAmount for a running total that would no longer fit.
    pub fn amount_overflow(field: impl Into<String>) -> Self {
        CoreError::invalid_amount(field, "exceeds the largest representable amount")
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A number falls outside the range the till can represent.
    #[error("{field} is out of range")]
    OutOfRange { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
