//! # Validation Module
//!
//! Input normalization and validation for till commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                  │
//! │  └── Widgets, immediate feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command bridge (terminal)                                     │
//! │  └── Type validation (deserialization)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                   │
//! │  ├── Quantity coercion (never rejects, never negative)                  │
//! │  └── Amount checks (reject negatives with InvalidAmount)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a table identifier.
pub const MAX_TABLE_LEN: usize = 32;

/// Maximum length of a free-text note (line item or ticket).
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// Numeric Normalizers
// =============================================================================

/// Coerces a requested quantity into a usable line quantity.
///
/// ## Rules
/// - Positive values pass through
/// - Zero or negative input is treated as 1
///
/// ```rust
/// use somtam_core::validation::coerce_quantity;
///
/// assert_eq!(coerce_quantity(3), 3);
/// assert_eq!(coerce_quantity(0), 1);
/// assert_eq!(coerce_quantity(-4), 1);
/// ```
pub fn coerce_quantity(requested: i64) -> u32 {
    if requested <= 0 {
        1
    } else {
        u32::try_from(requested).unwrap_or(u32::MAX)
    }
}

/// Validates a monetary amount that must not be negative.
///
/// Zero is allowed (free items, nothing received yet).
///
/// ```rust
/// use somtam_core::money::Money;
/// use somtam_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from_cents(0)).is_ok());
/// assert!(validate_non_negative("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> CoreResult<Money> {
    if amount.is_negative() {
        return Err(CoreError::invalid_amount(field, "must not be negative"));
    }
    Ok(amount)
}

/// Validates a cash denomination. Must be strictly positive.
pub fn validate_denomination(amount: Money) -> CoreResult<Money> {
    if !amount.is_positive() {
        return Err(CoreError::invalid_amount(
            "denomination",
            "must be greater than zero",
        ));
    }
    Ok(amount)
}

// =============================================================================
// String Normalizers
// =============================================================================

/// Validates a table identifier. Empty is allowed (takeaway, counter).
///
/// ## Returns
/// The trimmed table string.
pub fn validate_table(table: &str) -> ValidationResult<String> {
    let table = table.trim();

    if table.chars().count() > MAX_TABLE_LEN {
        return Err(ValidationError::TooLong {
            field: "table".to_string(),
            max: MAX_TABLE_LEN,
        });
    }

    Ok(table.to_string())
}

/// Validates a free-text note.
///
/// ## Returns
/// The trimmed note string.
pub fn validate_note(note: &str) -> ValidationResult<String> {
    let note = note.trim();

    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }

    Ok(note.to_string())
}

/// Normalizes a modifier list into its canonical form: trimmed, empty
/// entries dropped, sorted, de-duplicated.
pub fn normalize_modifiers<I, S>(modifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = modifiers
        .into_iter()
        .map(|m| m.as_ref().trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Validates that an identifier argument is present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_quantity() {
        assert_eq!(coerce_quantity(1), 1);
        assert_eq!(coerce_quantity(12), 12);
        assert_eq!(coerce_quantity(0), 1);
        assert_eq!(coerce_quantity(-7), 1);
        assert_eq!(coerce_quantity(i64::MAX), u32::MAX);
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("received", Money::from_cents(0)).is_ok());
        assert!(validate_non_negative("received", Money::from_cents(100)).is_ok());
        let err = validate_non_negative("received", Money::from_cents(-100)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_validate_denomination() {
        assert!(validate_denomination(Money::from_major(100)).is_ok());
        assert!(validate_denomination(Money::zero()).is_err());
        assert!(validate_denomination(Money::from_cents(-500)).is_err());
    }

    #[test]
    fn test_validate_table() {
        assert_eq!(validate_table("  A4 ").unwrap(), "A4");
        assert_eq!(validate_table("").unwrap(), "");
        assert!(validate_table(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_normalize_modifiers() {
        let mods = normalize_modifiers(["no peanuts", " extra lime", "", "no peanuts"]);
        assert_eq!(mods, vec!["extra lime".to_string(), "no peanuts".to_string()]);
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("ticket id", "P1").is_ok());
        assert!(validate_id("ticket id", "  ").is_err());
    }
}
