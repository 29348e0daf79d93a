//! # Query Compiler
//!
//! Turns loosely-typed request parameters into SQL fragments.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RawParameterMap                                                        │
//! │       │                                                                 │
//! │       ▼  key.rs        "price_ormode" → (price, OR)                     │
//! │       ▼  operator.rs   "~gt~280"      → (Gt, "280")                     │
//! │       ▼  value.rs      "280"          → Int(280)                        │
//! │       ▼  operator.rs   (Int, Gt)      → "price > 280"   (escape.rs)     │
//! │       ▼  predicate.rs  fragments      → "((price > 280))"               │
//! │                                                                         │
//! │  SortSpec     ── order.rs ──►  "price DESC, id ASC"                     │
//! │  PageRequest  ── page.rs  ──►  LIMIT / OFFSET                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure. The compiled clause is a plain string spliced
//! after `WHERE`; every literal has passed through a [`LiteralEscaper`].

pub mod escape;
pub mod key;
pub mod operator;
pub mod order;
pub mod page;
pub mod params;
pub mod predicate;
pub mod value;

pub use escape::{is_identifier, LiteralEscaper, SqliteEscaper};
pub use key::{Combinator, DecomposedKey, GLOBAL_COMBINATOR_KEY, ORMODE_TOKEN};
pub use operator::{compile_token, map_operator, OperatorCode, ValueToken};
pub use order::{compile_order, SortDirection, SortSpec};
pub use page::{Page, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use params::{ListQuery, ParamValue, RawParameterMap};
pub use predicate::{FilterClause, PredicateBuilder};
pub use value::{evaluate, evaluate_as, parse_bool, DatePrecision, EvaluatedValue, ValueKind};
