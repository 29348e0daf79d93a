//! # Key Decomposer
//!
//! Splits a filter parameter key into a column name and the combinator used
//! between that column's own value tokens.
//!
//! ```text
//! "name"                → name          AND
//! "name_ormode"         → name          OR
//! "lowest_price"        → lowest_price  AND
//! "lowest_price_ormode" → lowest_price  OR
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trailing key segment that switches a field's tokens to OR.
pub const ORMODE_TOKEN: &str = "ormode";

/// Reserved key selecting AND/OR between different fields.
pub const GLOBAL_COMBINATOR_KEY: &str = "opmodeor";

/// Boolean connective between clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    /// The joiner placed between two clauses, spaces included.
    pub fn separator(&self) -> &'static str {
        match self {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
        }
    }

    pub fn is_or(&self) -> bool {
        matches!(self, Combinator::Or)
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A parameter key after decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedKey {
    pub field_name: String,
    pub combinator: Combinator,
}

impl DecomposedKey {
    /// Decomposes `key`.
    ///
    /// The last `_` segment selects OR when it equals [`ORMODE_TOKEN`]; in
    /// every other case the segments are folded back into a compound
    /// column name and the field combinator stays AND.
    pub fn parse(key: &str) -> Self {
        match key.rsplit_once('_') {
            Some((field, last)) if last == ORMODE_TOKEN && !field.is_empty() => DecomposedKey {
                field_name: field.to_string(),
                combinator: Combinator::Or,
            },
            _ => DecomposedKey {
                field_name: key.to_string(),
                combinator: Combinator::And,
            },
        }
    }

    pub fn field_combinator_is_or(&self) -> bool {
        self.combinator.is_or()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let key = DecomposedKey::parse("name");
        assert_eq!(key.field_name, "name");
        assert_eq!(key.combinator, Combinator::And);
    }

    #[test]
    fn test_two_segments() {
        let key = DecomposedKey::parse("name_ormode");
        assert_eq!(key.field_name, "name");
        assert!(key.field_combinator_is_or());

        let key = DecomposedKey::parse("lowest_price");
        assert_eq!(key.field_name, "lowest_price");
        assert_eq!(key.combinator, Combinator::And);
    }

    #[test]
    fn test_three_segments() {
        let key = DecomposedKey::parse("lowest_price_ormode");
        assert_eq!(key.field_name, "lowest_price");
        assert_eq!(key.combinator, Combinator::Or);

        let key = DecomposedKey::parse("expiration_date_utc");
        assert_eq!(key.field_name, "expiration_date_utc");
        assert_eq!(key.combinator, Combinator::And);
    }

    #[test]
    fn test_bare_ormode_is_a_field() {
        let key = DecomposedKey::parse("ormode");
        assert_eq!(key.field_name, "ormode");
        assert_eq!(key.combinator, Combinator::And);

        let key = DecomposedKey::parse("_ormode");
        assert_eq!(key.field_name, "_ormode");
        assert_eq!(key.combinator, Combinator::And);
    }

    #[test]
    fn test_combinator_sql() {
        assert_eq!(Combinator::And.separator(), " AND ");
        assert_eq!(Combinator::Or.to_string(), "OR");
        assert_eq!(Combinator::default(), Combinator::And);
    }
}
