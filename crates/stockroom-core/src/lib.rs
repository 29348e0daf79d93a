//! # stockroom-core: Filter Compiler and Domain Types
//!
//! The pure half of Stockroom. It compiles request parameters into SQL
//! fragments and defines the inventory entities, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockroom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 HTTP routing (outside this workspace)           │    │
//! │  │      ?name[]=~sw~co&lowest_price=~gt~280&sort=id,desc&page=2    │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ ListQuery                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │              ★ stockroom-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   query   │  │   types   │  │ validation│  │   error   │    │    │
//! │  │   │ WHERE     │  │ Product   │  │   rules   │  │ CoreError │    │    │
//! │  │   │ ORDER BY  │  │ Stock ... │  │   checks  │  │           │    │    │
//! │  │   │ OFFSET    │  │ Entity    │  │           │  │           │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                  stockroom-db (Database Layer)                  │    │
//! │  │        pool, transactions, repositories, migrations             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`query`] - Predicate, order and pagination compilers
//! - [`types`] - Entities and the [`Entity`] contract
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::query::{ListQuery, PredicateBuilder, SqliteEscaper};
//!
//! let query = ListQuery::from_pairs([
//!     ("description[]", "~sw~ab"),
//!     ("description[]", "~ew~ted"),
//!     ("lowest_price", "~gt~280"),
//!     ("opmodeor", "true"),
//! ])
//! .unwrap();
//!
//! let clause = PredicateBuilder::new(&SqliteEscaper)
//!     .build(&query.filters)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(
//!     clause.as_str(),
//!     "((description LIKE 'ab%' AND description LIKE '%ted') OR (lowest_price > 280))"
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest accepted display name (products, storages, suppliers).
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted login name.
pub const MAX_USERNAME_LENGTH: usize = 64;
