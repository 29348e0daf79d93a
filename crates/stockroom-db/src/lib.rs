//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite storage for the inventory entities, reached through sqlx.
//! List reads take filter, sort and page parameters compiled by
//! `stockroom-core`; every write runs inside an explicit transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Handler (GET /products?description[]=~sw~ab&...)                       │
//! │       │                                                                 │
//! │       ▼  ListQuery::from_pairs                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   stockroom-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌─────────────────┐   ┌──────────────┐    │    │
//! │  │   │   Database    │   │  Repositories   │   │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │   │ EntityRepository│   │  (embedded)  │    │    │
//! │  │   │               │   │  <Product>, ... │   │              │    │    │
//! │  │   │ SqlitePool    │◄──│                 │   │ 001_init.sql │    │    │
//! │  │   │ QueryContext  │   │ reads ─► pool   │   │ 002_idx.sql  │    │    │
//! │  │   │ (deadline)    │   │ writes ─► Tx    │   │              │    │    │
//! │  │   └───────────────┘   └─────────────────┘   └──────────────┘    │    │
//! │  │                              │                                  │    │
//! │  │                   TransactionalExecutor                         │    │
//! │  │                   BEGIN ─► stmts ─► COMMIT / ROLLBACK           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database                             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, checkout and repository access
//! - [`config`] - Environment configuration
//! - [`context`] - Per-request id and deadline
//! - [`transaction`] - Transactional write executor
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Generic entity repository and per-entity statements
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::query::ListQuery;
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let ctx = db.context();
//!
//! let query = ListQuery::from_pairs([("name", "~sw~cola"), ("sort", "name,asc")])?;
//! let page = db.products().list(&ctx, &query).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ConfigError;
pub use context::QueryContext;
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use transaction::{SqlValue, TransactionalExecutor, WriteOutcome, WriteStatement};

pub use repository::{EntityRepository, EntityStatements, UpdateOutcome};

// Repository re-exports for convenience
pub use repository::{
    ProductRepository, StockRepository, StorageRepository, SupplierRepository, UserRepository,
    ValidityRepository,
};
