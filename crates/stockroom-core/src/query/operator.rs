//! # Operator Mapper
//!
//! Turns one evaluated literal plus an operator code into a SQL comparison.
//!
//! ## Mapping Table
//! ```text
//! ┌──────────┬──────────────┬──────────────────────┬──────────┐
//! │ code     │ numeric/bool │ string               │ date     │
//! ├──────────┼──────────────┼──────────────────────┼──────────┤
//! │ (empty)  │ =            │ LIKE 'v'             │ =        │
//! │ eq       │ =            │ =                    │ =        │
//! │ neq      │ !=           │ <>                   │ <>       │
//! │ lt       │ <            │ —                    │ <        │
//! │ lteq     │ <=           │ —                    │ —        │
//! │ gt       │ >            │ —                    │ >        │
//! │ gteq     │ >=           │ —                    │ —        │
//! │ sw       │ —            │ LIKE 'v%'            │ —        │
//! │ ew       │ —            │ LIKE '%v'            │ —        │
//! └──────────┴──────────────┴──────────────────────┴──────────┘
//!   — : no fragment is produced for that token
//! ```

use std::fmt;
use std::str::FromStr;

use super::escape::LiteralEscaper;
use super::value::{evaluate, EvaluatedValue};

/// Separator between operator code and literal inside a value token.
pub const TOKEN_SEPARATOR: char = '~';

/// Comparison selector attached to a value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorCode {
    /// No code given.
    #[default]
    Default,
    Eq,
    Neq,
    Lt,
    Lteq,
    Gt,
    Gteq,
    /// Starts with.
    Sw,
    /// Ends with.
    Ew,
}

impl OperatorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorCode::Default => "",
            OperatorCode::Eq => "eq",
            OperatorCode::Neq => "neq",
            OperatorCode::Lt => "lt",
            OperatorCode::Lteq => "lteq",
            OperatorCode::Gt => "gt",
            OperatorCode::Gteq => "gteq",
            OperatorCode::Sw => "sw",
            OperatorCode::Ew => "ew",
        }
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown operator code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for OperatorCode {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(OperatorCode::Default),
            "eq" => Ok(OperatorCode::Eq),
            "neq" => Ok(OperatorCode::Neq),
            "lt" => Ok(OperatorCode::Lt),
            "lteq" => Ok(OperatorCode::Lteq),
            "gt" => Ok(OperatorCode::Gt),
            "gteq" => Ok(OperatorCode::Gteq),
            "sw" => Ok(OperatorCode::Sw),
            "ew" => Ok(OperatorCode::Ew),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// One filter value as written in the query string.
///
/// ## Accepted Forms
/// ```text
/// "coke"            → (Default, "coke")
/// "gt~280"          → (Gt, "280")
/// "~sw~ab"          → (Sw, "ab")           leading segment ignored
/// "x~eq~a~b"        → (Eq, "a~b")          literal may contain '~'
/// "a~b"             → (Default, "a~b")     'a' is no operator code
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueToken<'a> {
    pub operator: OperatorCode,
    pub literal: &'a str,
}

impl<'a> ValueToken<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let literal_only = ValueToken {
            operator: OperatorCode::Default,
            literal: raw,
        };

        let mut parts = raw.splitn(3, TOKEN_SEPARATOR);
        let first = parts.next().unwrap_or_default();
        let (code, literal) = match (parts.next(), parts.next()) {
            (None, _) => return literal_only,
            (Some(literal), None) => (first, literal),
            (Some(code), Some(literal)) => (code, literal),
        };

        match code.parse() {
            Ok(operator) => ValueToken { operator, literal },
            Err(_) => literal_only,
        }
    }
}

/// Maps an evaluated literal to `"<field> <op> <literal>"`.
///
/// Returns `None` for combinations the table leaves empty.
///
/// ## Example
/// ```rust
/// use stockroom_core::query::{evaluate, map_operator, OperatorCode, SqliteEscaper};
///
/// let fragment = map_operator(&evaluate("280"), OperatorCode::Gt, "lowest_price", &SqliteEscaper);
/// assert_eq!(fragment.as_deref(), Some("lowest_price > 280"));
///
/// let fragment = map_operator(&evaluate("ab"), OperatorCode::Lt, "name", &SqliteEscaper);
/// assert_eq!(fragment, None);
/// ```
pub fn map_operator<E>(
    value: &EvaluatedValue,
    operator: OperatorCode,
    field: &str,
    escaper: &E,
) -> Option<String>
where
    E: LiteralEscaper + ?Sized,
{
    let literal = escaper.escape(&value.render());

    let comparison = match value {
        EvaluatedValue::Int(_) | EvaluatedValue::Float(_) | EvaluatedValue::Bool(_) => {
            let op = match operator {
                OperatorCode::Default | OperatorCode::Eq => "=",
                OperatorCode::Neq => "!=",
                OperatorCode::Lt => "<",
                OperatorCode::Lteq => "<=",
                OperatorCode::Gt => ">",
                OperatorCode::Gteq => ">=",
                OperatorCode::Sw | OperatorCode::Ew => return None,
            };
            format!("{} {}", op, literal)
        }
        EvaluatedValue::String(_) => match operator {
            OperatorCode::Default => format!("LIKE '{}'", literal),
            OperatorCode::Eq => format!("= '{}'", literal),
            OperatorCode::Neq => format!("<> '{}'", literal),
            OperatorCode::Sw => format!("LIKE '{}%'", literal),
            OperatorCode::Ew => format!("LIKE '%{}'", literal),
            OperatorCode::Lt | OperatorCode::Lteq | OperatorCode::Gt | OperatorCode::Gteq => {
                return None
            }
        },
        EvaluatedValue::Date { .. } => {
            let op = match operator {
                OperatorCode::Default | OperatorCode::Eq => "=",
                OperatorCode::Neq => "<>",
                OperatorCode::Lt => "<",
                OperatorCode::Gt => ">",
                OperatorCode::Lteq | OperatorCode::Gteq | OperatorCode::Sw | OperatorCode::Ew => {
                    return None
                }
            };
            format!("{} '{}'", op, literal)
        }
    };

    Some(format!("{} {}", field, comparison))
}

/// Parses, evaluates and maps one raw token for `field`.
pub fn compile_token<E>(raw: &str, field: &str, escaper: &E) -> Option<String>
where
    E: LiteralEscaper + ?Sized,
{
    let token = ValueToken::parse(raw);
    map_operator(&evaluate(token.literal), token.operator, field, escaper)
}
