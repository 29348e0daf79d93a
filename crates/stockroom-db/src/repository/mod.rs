//! # Repository Module
//!
//! Database repositories for Stockroom entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Generic Repository                               │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.products().list(&ctx, &query)                               │
//! │       ▼                                                                 │
//! │  EntityRepository<Product>                                              │
//! │  ├── list / count / get / find_by_id / exists   (reads, pooled)         │
//! │  ├── insert / update / delete                   (TransactionalExecutor) │
//! │  └── per-entity extras (stock transfer, expiring validities, ...)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each entity module supplies [`EntityStatements`] and any extra queries
//! as an inherent `impl EntityRepository<E>` block.

pub mod entity;
pub mod product;
pub mod stock;
pub mod storage;
pub mod supplier;
pub mod user;
pub mod validity;

pub use entity::{EntityRepository, EntityStatements, UpdateOutcome};
pub use product::ProductRepository;
pub use stock::StockRepository;
pub use storage::StorageRepository;
pub use supplier::SupplierRepository;
pub use user::UserRepository;
pub use validity::ValidityRepository;
