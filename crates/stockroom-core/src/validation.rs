//! # Validation Module
//!
//! Field rules checked before a write reaches the database.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Entity::validate (THIS MODULE)                                │
//! │  ├── Required / length checks                                           │
//! │  └── Price and quantity ranges                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints                                                 │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_name, validate_non_negative};
//!
//! validate_name("name", "Cold room A").unwrap();
//! assert!(validate_non_negative("quantity", -1).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_NAME_LENGTH, MAX_USERNAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters after trimming
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates optional free text against a length limit.
pub fn validate_optional_text(field: &str, text: Option<&str>, max: usize) -> ValidationResult<()> {
    match text {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a login name.
///
/// ## Rules
/// - 3 to [`MAX_USERNAME_LENGTH`] characters
/// - Letters, digits, `.`, `-` and `_` only
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_username;
///
/// assert!(validate_username("ann.smith").is_ok());
/// assert!(validate_username("a b").is_err());
/// ```
pub fn validate_username(username: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    let length = username.chars().count();
    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
        });
    }
    if length < 3 {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must be at least 3 characters".to_string(),
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '.', '-' and '_'".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };

    if !well_formed || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity or price that may be zero but never negative.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product's price bracket.
///
/// ## Rules
/// - Both prices are non-negative
/// - `lowest_price <= highest_price`
pub fn validate_price_range(lowest: i64, highest: i64) -> ValidationResult<()> {
    validate_non_negative("lowest_price", lowest)?;
    validate_non_negative("highest_price", highest)?;

    if lowest > highest {
        return Err(ValidationError::InvalidFormat {
            field: "lowest_price".to_string(),
            reason: "must not exceed highest_price".to_string(),
        });
    }

    Ok(())
}

/// Validates a reference to another row.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
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
    fn test_validate_name() {
        assert!(validate_name("name", "Cold room A").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("address", None, 5).is_ok());
        assert!(validate_optional_text("address", Some("12345"), 5).is_ok());
        assert!(validate_optional_text("address", Some("123456"), 5).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ann").is_ok());
        assert!(validate_username("ann.smith-2").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("an").is_err());
        assert!(validate_username("ann smith").is_err());
        assert!(validate_username("ann'--").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ann@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ann").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ann@example").is_err());
        assert!(validate_email("ann@.com").is_err());
        assert!(validate_email("a nn@example.com").is_err());
    }

    #[test]
    fn test_validate_price_range() {
        assert!(validate_price_range(0, 0).is_ok());
        assert!(validate_price_range(250, 300).is_ok());
        assert!(validate_price_range(-1, 300).is_err());
        assert!(validate_price_range(300, 250).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("product_id", 1).is_ok());
        assert!(validate_id("product_id", 0).is_err());
        assert!(validate_id("product_id", -4).is_err());
    }
}
