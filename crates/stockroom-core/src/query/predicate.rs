//! # Predicate Builder
//!
//! Compiles a [`RawParameterMap`] into one WHERE-clause body.
//!
//! ## Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  description[] = ~sw~ab, ~ew~ted    lowest_price = ~gt~280              │
//! │  opmodeor = true                                                        │
//! │                                                                         │
//! │  per field (field combinator, default AND)                              │
//! │    (description LIKE 'ab%' AND description LIKE '%ted')                 │
//! │    (lowest_price > 280)                                                 │
//! │                                                                         │
//! │  between fields (global combinator from opmodeor)                       │
//! │    ((description LIKE 'ab%' AND description LIKE '%ted')                │
//! │       OR (lowest_price > 280))                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Groups are built by joining fragments, so a combinator only ever sits
//! between two fragments and never before a closing parenthesis. Tokens
//! whose (operator, kind) pair has no mapping are dropped; a field left
//! with no fragments contributes no group.

use std::fmt;

use super::escape::{is_identifier, LiteralEscaper};
use super::key::DecomposedKey;
use super::operator::compile_token;
use super::params::RawParameterMap;
use crate::error::{CoreError, CoreResult};

/// A compiled WHERE body, always wrapped in one outer parenthesis pair.
///
/// Never empty: an empty filter compiles to `None` instead, and callers
/// omit the `WHERE` keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause(String);

impl FilterClause {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// `" WHERE <clause>"` for splicing after a table name.
    pub fn to_where_sql(&self) -> String {
        format!(" WHERE {}", self.0)
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilterClause {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds WHERE bodies against one escaper and an optional column list.
///
/// ## Example
/// ```rust
/// use stockroom_core::query::{PredicateBuilder, RawParameterMap, SqliteEscaper};
///
/// let params = RawParameterMap::new().with("name", "~sw~cola");
/// let clause = PredicateBuilder::new(&SqliteEscaper).build(&params).unwrap().unwrap();
/// assert_eq!(clause.as_str(), "((name LIKE 'cola%'))");
/// ```
#[derive(Debug, Clone)]
pub struct PredicateBuilder<'a, E: ?Sized> {
    escaper: &'a E,
    entity: &'a str,
    allowed: Option<&'a [&'a str]>,
}

impl<'a, E> PredicateBuilder<'a, E>
where
    E: LiteralEscaper + ?Sized,
{
    pub fn new(escaper: &'a E) -> Self {
        PredicateBuilder {
            escaper,
            entity: "record",
            allowed: None,
        }
    }

    /// Restricts filterable fields to `columns` of `entity`.
    pub fn allow_fields(mut self, entity: &'a str, columns: &'a [&'a str]) -> Self {
        self.entity = entity;
        self.allowed = Some(columns);
        self
    }

    /// Compiles `params`.
    ///
    /// ## Returns
    /// * `Ok(Some(clause))` - at least one fragment was produced
    /// * `Ok(None)` - nothing to filter on; omit `WHERE`
    /// * `Err(_)` - a key names an invalid or unknown field
    pub fn build(&self, params: &RawParameterMap) -> CoreResult<Option<FilterClause>> {
        let mut groups = Vec::new();

        for (key, value) in params.fields() {
            let key = DecomposedKey::parse(key);
            self.check_field(&key.field_name)?;

            let fragments: Vec<String> = value
                .tokens()
                .iter()
                .filter_map(|raw| compile_token(raw, &key.field_name, self.escaper))
                .collect();

            if fragments.is_empty() {
                continue;
            }
            groups.push(format!("({})", fragments.join(key.combinator.separator())));
        }

        if groups.is_empty() {
            return Ok(None);
        }

        let global = params.global_combinator();
        Ok(Some(FilterClause(format!(
            "({})",
            groups.join(global.separator())
        ))))
    }

    fn check_field(&self, field: &str) -> CoreResult<()> {
        if !is_identifier(field) {
            return Err(CoreError::InvalidField(field.to_string()));
        }
        match self.allowed {
            Some(allowed) if !allowed.contains(&field) => Err(CoreError::UnknownField {
                entity: self.entity.to_string(),
                field: field.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::escape::SqliteEscaper;
    use crate::query::params::ListQuery;

    fn build(params: &RawParameterMap) -> Option<String> {
        PredicateBuilder::new(&SqliteEscaper)
            .build(params)
            .unwrap()
            .map(FilterClause::into_string)
    }

    fn is_balanced(clause: &str) -> bool {
        let mut depth = 0i32;
        let mut in_literal = false;
        for c in clause.chars() {
            match c {
                '\'' => in_literal = !in_literal,
                '(' if !in_literal => depth += 1,
                ')' if !in_literal => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0 && !in_literal
    }

    fn has_dangling_combinator(clause: &str) -> bool {
        clause.contains("AND )")
            || clause.contains("OR )")
            || clause.contains("AND)")
            || clause.contains("OR)")
            || clause.trim_end().ends_with("AND")
            || clause.trim_end().ends_with("OR")
    }

    #[test]
    fn test_description_and_price_fixture() {
        let query = ListQuery::from_pairs([
            ("description[]", "~sw~ab"),
            ("description[]", "~ew~ted"),
            ("lowest_price", "~gt~280"),
            ("opmodeor", "true"),
        ])
        .unwrap();

        assert_eq!(
            build(&query.filters).as_deref(),
            Some("((description LIKE 'ab%' AND description LIKE '%ted') OR (lowest_price > 280))")
        );
    }

    #[test]
    fn test_empty_map_yields_no_clause() {
        assert_eq!(build(&RawParameterMap::new()), None);
        // The global combinator alone filters nothing.
        assert_eq!(build(&RawParameterMap::new().with("opmodeor", "true")), None);
    }

    #[test]
    fn test_single_token_is_wrapped() {
        let params = RawParameterMap::new().with("quantity", "~gteq~5");
        assert_eq!(build(&params).as_deref(), Some("((quantity >= 5))"));
    }

    #[test]
    fn test_fields_default_to_and() {
        let params = RawParameterMap::new()
            .with("name", "cola")
            .with("lowest_price", "~lt~100");
        assert_eq!(
            build(&params).as_deref(),
            Some("((lowest_price < 100) AND (name LIKE 'cola'))")
        );
    }

    #[test]
    fn test_field_ormode() {
        let params = RawParameterMap::new().with("name_ormode", ["cola", "~sw~pep"]);
        assert_eq!(
            build(&params).as_deref(),
            Some("((name LIKE 'cola' OR name LIKE 'pep%'))")
        );
    }

    #[test]
    fn test_date_range_as_two_tokens() {
        let params = RawParameterMap::new()
            .with("expiration_date", ["~gt~2024-01-01", "~lt~2024-12-31"]);
        assert_eq!(
            build(&params).as_deref(),
            Some("((expiration_date > '2024-01-01' AND expiration_date < '2024-12-31'))")
        );
    }

    #[test]
    fn test_inclusive_date_bounds_have_no_mapping() {
        let params = RawParameterMap::new().with("expiration_date", "~gteq~2024-01-01");
        assert_eq!(build(&params), None);

        let params = RawParameterMap::new().with("expiration_date", "~lteq~2024-12-31");
        assert_eq!(build(&params), None);

        // Only the exclusive bound survives.
        let params = RawParameterMap::new()
            .with("expiration_date", ["~gteq~2024-01-01", "~lt~2024-12-31"]);
        assert_eq!(build(&params).as_deref(), Some("((expiration_date < '2024-12-31'))"));
    }

    #[test]
    fn test_unmapped_tokens_are_dropped() {
        // `lt` on a string has no mapping.
        let params = RawParameterMap::new()
            .with("name", ["~lt~abc", "~sw~co"])
            .with("description", "~gt~text");
        assert_eq!(build(&params).as_deref(), Some("((name LIKE 'co%'))"));

        let params = RawParameterMap::new().with("name", "~lteq~abc");
        assert_eq!(build(&params), None);
    }

    #[test]
    fn test_literals_are_escaped() {
        let params = RawParameterMap::new().with("name", "x' OR '1'='1");
        assert_eq!(
            build(&params).as_deref(),
            Some("((name LIKE 'x'' OR ''1''=''1'))")
        );
    }

    #[test]
    fn test_invalid_field_is_rejected() {
        let params = RawParameterMap::new().with("name) OR (1=1", "x");
        let result = PredicateBuilder::new(&SqliteEscaper).build(&params);
        assert!(matches!(result, Err(CoreError::InvalidField(_))));
    }

    #[test]
    fn test_allowed_fields() {
        let columns: &[&str] = &["id", "username"];
        let builder = PredicateBuilder::new(&SqliteEscaper).allow_fields("User", columns);

        let params = RawParameterMap::new().with("password_hash", "~sw~$argon");
        assert!(matches!(
            builder.build(&params),
            Err(CoreError::UnknownField { ref field, .. }) if field == "password_hash"
        ));

        let params = RawParameterMap::new().with("username_ormode", ["ann", "bob"]);
        assert!(builder.build(&params).unwrap().is_some());
    }

    #[test]
    fn test_clauses_are_balanced_without_dangling_combinators() {
        let cases: Vec<RawParameterMap> = vec![
            RawParameterMap::new().with("a", "1"),
            RawParameterMap::new().with("a", ["1", "2", "3"]),
            RawParameterMap::new().with("a_ormode", ["1", "~lt~x", "3"]),
            RawParameterMap::new()
                .with("a", ["~sw~(", "~ew~)"])
                .with("b_ormode", ["x", "y"])
                .with("opmodeor", "1"),
            RawParameterMap::new()
                .with("a", ["~lt~x", "~gt~y"])
                .with("b", "2024-02-29")
                .with("c", "~neq~false"),
        ];

        for params in cases {
            let clause = build(&params).expect("non-empty clause");
            assert!(clause.starts_with('(') && clause.ends_with(')'), "{clause}");
            assert!(is_balanced(&clause), "{clause}");
            assert!(!has_dangling_combinator(&clause), "{clause}");
        }
    }

    #[test]
    fn test_where_sql() {
        let params = RawParameterMap::new().with("id", "3");
        let clause = PredicateBuilder::new(&SqliteEscaper)
            .build(&params)
            .unwrap()
            .unwrap();
        assert_eq!(clause.to_where_sql(), " WHERE ((id = 3))");
    }
}
