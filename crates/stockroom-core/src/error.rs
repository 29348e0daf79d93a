//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Filter / sort / page compilation failures      │
//! │  └── ValidationError  - Entity field validation failures               │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::InvalidEntity                        │
//! │        CoreError       → DbError::InvalidQuery                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are plain values built per call. Nothing here is shared or
//! mutated after construction.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while compiling request parameters into SQL fragments.
///
/// Value tokens never fail (they degrade to strings); only the structural
/// parts of a request can: field names, sort directions and paging.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Field name is not a plain SQL identifier.
    ///
    /// ## When This Occurs
    /// - `?price;DROP=1`
    /// - `?na me=x`
    ///
    /// Field names are interpolated unescaped, so anything outside
    /// `[A-Za-z_][A-Za-z0-9_]*` is refused outright.
    #[error("Invalid field name: '{0}'")]
    InvalidField(String),

    /// Field is an identifier but not one the entity exposes.
    #[error("Unknown field '{field}' for {entity}")]
    UnknownField { entity: String, field: String },

    /// Sort parameter is malformed or names an unknown direction.
    #[error("Invalid sort '{value}': {reason}")]
    InvalidSort { value: String, reason: String },

    /// Page or limit is missing, non-numeric, or below 1.
    #[error("Invalid {field}: '{value}' (must be an integer >= 1)")]
    InvalidPage { field: String, value: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Entity validation errors.
///
/// Raised before a write reaches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownField {
            entity: "Product".to_string(),
            field: "password".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown field 'password' for Product");

        let err = CoreError::InvalidPage {
            field: "page".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid page: '0' (must be an integer >= 1)");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }
}
