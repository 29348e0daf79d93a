//! # Value Evaluator
//!
//! Classifies a raw filter literal before it is turned into SQL.
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   "2024" ─► which kind?                                 │
//! │                                                                         │
//! │   1. Int    ── "2024" parses ─────────────────────► Int(2024)   STOP   │
//! │   2. Float  ── "2.5", "-1e3"                                           │
//! │   3. Bool   ── "true", "off", "yes" ...                                │
//! │   4. Date   ── "2024-01-05", "24-01-05T10:30" ...                      │
//! │   5. String ── everything else                                         │
//! │                                                                         │
//! │   First match wins. A numeric-looking token is never a date, and a     │
//! │   parseable date is never a string.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// The kinds a literal can evaluate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Date,
    String,
}

/// The order in which [`evaluate`] tries each kind.
pub const EVALUATION_ORDER: [ValueKind; 5] = [
    ValueKind::Int,
    ValueKind::Float,
    ValueKind::Bool,
    ValueKind::Date,
    ValueKind::String,
];

/// How much of a timestamp the literal spelled out.
///
/// Rendering keeps the original precision so that `'2024-01-05'` still
/// compares correctly against ISO-8601 text stored in SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Day,
    Minute,
    Second,
}

impl DatePrecision {
    fn render_format(&self) -> &'static str {
        match self {
            DatePrecision::Day => "%Y-%m-%d",
            DatePrecision::Minute => "%Y-%m-%dT%H:%M",
            DatePrecision::Second => "%Y-%m-%dT%H:%M:%S",
        }
    }
}

/// Accepted date layouts with a four-digit year.
const FULL_YEAR_FORMATS: [(&str, DatePrecision); 3] = [
    ("%Y-%m-%d", DatePrecision::Day),
    ("%Y-%m-%dT%H:%M", DatePrecision::Minute),
    ("%Y-%m-%dT%H:%M:%S", DatePrecision::Second),
];

/// Accepted date layouts with a two-digit year.
const SHORT_YEAR_FORMATS: [(&str, DatePrecision); 3] = [
    ("%y-%m-%d", DatePrecision::Day),
    ("%y-%m-%dT%H:%M", DatePrecision::Minute),
    ("%y-%m-%dT%H:%M:%S", DatePrecision::Second),
];

/// A literal after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Date {
        at: NaiveDateTime,
        precision: DatePrecision,
    },
    String(String),
}

impl EvaluatedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            EvaluatedValue::Int(_) => ValueKind::Int,
            EvaluatedValue::Float(_) => ValueKind::Float,
            EvaluatedValue::Bool(_) => ValueKind::Bool,
            EvaluatedValue::Date { .. } => ValueKind::Date,
            EvaluatedValue::String(_) => ValueKind::String,
        }
    }

    /// Int, Float and Bool share the numeric operator column.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            EvaluatedValue::Int(_) | EvaluatedValue::Float(_) | EvaluatedValue::Bool(_)
        )
    }

    /// The literal text before escaping and quoting.
    ///
    /// Booleans render as `1`/`0`, the way SQLite stores them.
    pub fn render(&self) -> String {
        match self {
            EvaluatedValue::Int(v) => v.to_string(),
            EvaluatedValue::Float(v) => v.to_string(),
            EvaluatedValue::Bool(true) => "1".to_string(),
            EvaluatedValue::Bool(false) => "0".to_string(),
            EvaluatedValue::Date { at, precision } => {
                at.format(precision.render_format()).to_string()
            }
            EvaluatedValue::String(v) => v.clone(),
        }
    }
}

impl fmt::Display for EvaluatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Classifies `raw`, trying each kind in [`EVALUATION_ORDER`].
///
/// Never fails: anything unrecognised comes back as
/// [`EvaluatedValue::String`].
///
/// ## Example
/// ```rust
/// use stockroom_core::query::{evaluate, ValueKind};
///
/// assert_eq!(evaluate("2024").kind(), ValueKind::Int);
/// assert_eq!(evaluate("2024-01-05").kind(), ValueKind::Date);
/// assert_eq!(evaluate("coke").kind(), ValueKind::String);
/// ```
pub fn evaluate(raw: &str) -> EvaluatedValue {
    EVALUATION_ORDER
        .iter()
        .find_map(|kind| evaluate_as(*kind, raw))
        .unwrap_or_else(|| EvaluatedValue::String(raw.to_string()))
}

/// Attempts a single kind.
pub fn evaluate_as(kind: ValueKind, raw: &str) -> Option<EvaluatedValue> {
    match kind {
        ValueKind::Int => parse_int(raw).map(EvaluatedValue::Int),
        ValueKind::Float => parse_float(raw).map(EvaluatedValue::Float),
        ValueKind::Bool => parse_bool(raw).map(EvaluatedValue::Bool),
        ValueKind::Date => {
            parse_date(raw).map(|(at, precision)| EvaluatedValue::Date { at, precision })
        }
        ValueKind::String => Some(EvaluatedValue::String(raw.to_string())),
    }
}

/// Splits an optional leading sign off a numeric token.
fn unsigned(raw: &str) -> &str {
    raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw)
}

/// `"007"` is an identifier-like code, not the number 7.
fn has_leading_zero(digits: &str) -> bool {
    digits.len() > 1 && digits.starts_with('0')
}

fn parse_int(raw: &str) -> Option<i64> {
    let digits = unsigned(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if has_leading_zero(digits) {
        return None;
    }
    raw.parse().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    let body = unsigned(raw);
    // Rejects "inf", "NaN" and friends that `f64::from_str` would accept.
    if body.is_empty()
        || !body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    let integer_part = body.split(&['.', 'e', 'E'][..]).next().unwrap_or_default();
    if has_leading_zero(integer_part) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parses the boolean family: `true/false`, `1/0`, `yes/no`, `on/off`.
///
/// `1` and `0` never reach this step through [`evaluate`] because the
/// integer parser claims them first.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<(NaiveDateTime, DatePrecision)> {
    let year_digits = raw.split('-').next().map(str::len).unwrap_or_default();
    let formats = match year_digits {
        4 => &FULL_YEAR_FORMATS,
        2 => &SHORT_YEAR_FORMATS,
        _ => return None,
    };

    formats.iter().find_map(|(format, precision)| {
        let at = match precision {
            DatePrecision::Day => NaiveDate::parse_from_str(raw, format)
                .ok()?
                .and_hms_opt(0, 0, 0)?,
            _ => NaiveDateTime::parse_from_str(raw, format).ok()?,
        };
        Some((at, *precision))
    })
}
