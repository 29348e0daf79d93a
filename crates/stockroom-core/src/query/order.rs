//! # Order Compiler
//!
//! Compiles `sort=price,desc&sort=id,asc` into `price DESC, id ASC`.
//!
//! The compiler has no built-in default. When nothing was requested the
//! caller passes its own fallback (repositories use `id ASC`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::escape::is_identifier;
use crate::error::{CoreError, CoreResult};

/// Sort direction, always rendered upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(CoreError::InvalidSort {
                value: s.to_string(),
                reason: "direction must be asc or desc".to_string(),
            }),
        }
    }
}

/// Ordered list of (field, direction) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec(Vec<(String, SortDirection)>);

impl SortSpec {
    pub fn new() -> Self {
        SortSpec::default()
    }

    /// A one-column spec, typically used as a call-site fallback.
    pub fn single(field: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec(vec![(field.into(), direction)])
    }

    /// Builds a spec from (field, direction) string pairs in any case.
    pub fn from_pairs<I, F, D>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (F, D)>,
        F: Into<String>,
        D: AsRef<str>,
    {
        let mut spec = SortSpec::new();
        for (field, direction) in pairs {
            spec.push(field, direction.as_ref().parse()?);
        }
        Ok(spec)
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.0.push((field.into(), direction));
    }

    /// Appends one `"field,direction"` query value. A missing direction
    /// means ascending.
    pub fn push_param(&mut self, raw: &str) -> CoreResult<()> {
        let (field, direction) = match raw.split_once(',') {
            Some((field, direction)) => (field.trim(), direction.parse()?),
            None => (raw.trim(), SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(CoreError::InvalidSort {
                value: raw.to_string(),
                reason: "missing field name".to_string(),
            });
        }
        self.push(field, direction);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.0.iter().map(|(field, direction)| (field.as_str(), *direction))
    }

    /// Returns `self`, or `fallback` when nothing was requested.
    pub fn or_else(&self, fallback: SortSpec) -> SortSpec {
        if self.is_empty() {
            fallback
        } else {
            self.clone()
        }
    }
}

/// Compiles `spec` into an ORDER BY body (without the keyword).
///
/// `allowed` restricts field names to an entity's columns; `None` only
/// enforces the identifier rule. An empty spec compiles to `None`.
///
/// ## Example
/// ```rust
/// use stockroom_core::query::{compile_order, SortSpec};
///
/// let spec = SortSpec::from_pairs([("price", "desc"), ("id", "asc")]).unwrap();
/// assert_eq!(compile_order(&spec, None).unwrap().as_deref(), Some("price DESC, id ASC"));
/// ```
pub fn compile_order(spec: &SortSpec, allowed: Option<&[&str]>) -> CoreResult<Option<String>> {
    let mut clause = String::new();
    for (field, direction) in spec.iter() {
        if !is_identifier(field) {
            return Err(CoreError::InvalidField(field.to_string()));
        }
        if let Some(allowed) = allowed {
            if !allowed.contains(&field) {
                return Err(CoreError::InvalidSort {
                    value: field.to_string(),
                    reason: "field is not sortable".to_string(),
                });
            }
        }
        clause.push_str(", ");
        clause.push_str(field);
        clause.push(' ');
        clause.push_str(direction.as_sql());
    }

    let clause = clause.trim_start_matches(", ");
    Ok((!clause.is_empty()).then(|| clause.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_are_upper_cased() {
        for pairs in [
            [("price", "desc"), ("id", "asc")],
            [("price", "DESC"), ("id", "Asc")],
            [("price", "Desc"), ("id", "ASC")],
        ] {
            let spec = SortSpec::from_pairs(pairs).unwrap();
            assert_eq!(
                compile_order(&spec, None).unwrap().as_deref(),
                Some("price DESC, id ASC")
            );
        }
    }

    #[test]
    fn test_empty_spec_compiles_to_none() {
        assert_eq!(compile_order(&SortSpec::new(), None).unwrap(), None);
    }

    #[test]
    fn test_fallback_lives_at_call_site() {
        let fallback = SortSpec::single("id", SortDirection::Asc);
        let spec = SortSpec::new().or_else(fallback);
        assert_eq!(compile_order(&spec, None).unwrap().as_deref(), Some("id ASC"));

        let requested = SortSpec::single("name", SortDirection::Desc);
        let spec = requested.or_else(SortSpec::single("id", SortDirection::Asc));
        assert_eq!(compile_order(&spec, None).unwrap().as_deref(), Some("name DESC"));
    }

    #[test]
    fn test_push_param() {
        let mut spec = SortSpec::new();
        spec.push_param("price,desc").unwrap();
        spec.push_param("name").unwrap();
        assert_eq!(
            compile_order(&spec, None).unwrap().as_deref(),
            Some("price DESC, name ASC")
        );

        assert!(spec.push_param("price,sideways").is_err());
        assert!(spec.push_param(",asc").is_err());
    }

    #[test]
    fn test_rejects_non_identifiers_and_unknown_columns() {
        let spec = SortSpec::single("id; DROP TABLE x", SortDirection::Asc);
        assert!(matches!(compile_order(&spec, None), Err(CoreError::InvalidField(_))));

        let spec = SortSpec::single("password_hash", SortDirection::Asc);
        let allowed: &[&str] = &["id", "username"];
        assert!(matches!(
            compile_order(&spec, Some(allowed)),
            Err(CoreError::InvalidSort { .. })
        ));
    }
}
