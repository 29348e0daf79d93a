//! # Request Parameters
//!
//! The raw filter map handed over by the routing layer, and the
//! [`ListQuery`] that bundles it with sorting and paging.
//!
//! ## Query String Mapping
//! ```text
//! ?description[]=~sw~ab&description[]=~ew~ted&lowest_price=~gt~280
//!  &opmodeor=true&sort=price,desc&page=2&limit=20
//!
//!   filters ── description  → Many["~sw~ab", "~ew~ted"]
//!              lowest_price → One("~gt~280")
//!              opmodeor     → One("true")
//!   sort    ── [(price, DESC)]
//!   page    ── page 2, limit 20
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::key::{Combinator, GLOBAL_COMBINATOR_KEY};
use super::order::SortSpec;
use super::page::PageRequest;
use super::value::parse_bool;
use crate::error::CoreResult;

/// Reserved paging / sorting keys. Everything else is a filter.
pub const PAGE_KEY: &str = "page";
pub const LIMIT_KEY: &str = "limit";
pub const SORT_KEY: &str = "sort";

/// Suffix marking a repeated (sequence) parameter.
const SEQUENCE_SUFFIX: &str = "[]";

/// One parameter value: a single token or an ordered token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn tokens(&self) -> &[String] {
        match self {
            ParamValue::One(value) => std::slice::from_ref(value),
            ParamValue::Many(values) => values,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::One(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Many(values)
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(values: [&str; N]) -> Self {
        ParamValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Filter parameters keyed by raw key. Keys are unique; ordering is by
/// key, which keeps compiled clauses deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParameterMap(BTreeMap<String, ParamValue>);

impl RawParameterMap {
    pub fn new() -> Self {
        RawParameterMap::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Appends one token to `key`, turning it into a sequence.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key: String = key.into();
        let value = value.into();
        let values = match self.0.remove(&key) {
            Some(ParamValue::One(first)) => vec![first, value],
            Some(ParamValue::Many(mut values)) => {
                values.push(value);
                values
            }
            None => vec![value],
        };
        self.0.insert(key, ParamValue::Many(values));
    }

    /// Chainable [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Combinator between different fields, read from `opmodeor`.
    pub fn global_combinator(&self) -> Combinator {
        let is_or = self
            .get(GLOBAL_COMBINATOR_KEY)
            .and_then(|value| value.tokens().last())
            .and_then(|raw| parse_bool(raw))
            .unwrap_or(false);
        if is_or {
            Combinator::Or
        } else {
            Combinator::And
        }
    }

    /// Field entries, excluding the reserved `opmodeor` key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != GLOBAL_COMBINATOR_KEY)
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Adds one decoded query pair; `key[]` accumulates into a sequence.
    fn add_pair(&mut self, key: &str, value: &str) {
        match key.strip_suffix(SEQUENCE_SUFFIX) {
            Some(base) => self.push(base, value),
            None => self.insert(key, value),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for RawParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RawParameterMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Everything a list read needs: filters, sort and page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub filters: RawParameterMap,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl ListQuery {
    pub fn new() -> Self {
        ListQuery::default()
    }

    /// Splits decoded query-string pairs into filters, sort and page.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::query::ListQuery;
    ///
    /// let query = ListQuery::from_pairs([
    ///     ("name[]", "cola"),
    ///     ("name[]", "~sw~pep"),
    ///     ("sort", "name,desc"),
    ///     ("page", "2"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(query.filters.len(), 1);
    /// assert_eq!(query.page.offset(), 10);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = RawParameterMap::new();
        let mut sort = SortSpec::new();
        let mut page = None;
        let mut limit = None;

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key.strip_suffix(SEQUENCE_SUFFIX).unwrap_or(key) {
                PAGE_KEY => page = Some(value.to_string()),
                LIMIT_KEY => limit = Some(value.to_string()),
                SORT_KEY => sort.push_param(value)?,
                _ => filters.add_pair(key, value),
            }
        }

        Ok(ListQuery {
            filters,
            sort,
            page: PageRequest::parse(page.as_deref(), limit.as_deref())?,
        })
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.filters.insert(key, value);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}
