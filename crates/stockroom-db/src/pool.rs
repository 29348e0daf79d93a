//! # Database Pool Management
//!
//! Connection pool creation, configuration and checkout for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Process startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) / DbConfig::from_env()                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← connection settings + pool + migrations  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │            SqlitePool                   │                            │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐        │                            │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...    │  (max_connections)         │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘        │                            │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       │ checkout(ctx) ──► PoolConnection, returned on drop              │
//! │       │ acquire_timeout elapsed ──► DbError::PoolExhausted              │
//! │       ▼                                                                 │
//! │  Repositories / TransactionalExecutor                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection Settings
//! Applied once per connection by the pool, never as a side effect elsewhere:
//! - WAL journal for concurrent reads
//! - NORMAL synchronous mode
//! - Foreign keys on

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use stockroom_core::{Product, Stock, Storage, Supplier, User, Validity};

use crate::context::QueryContext;
use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::EntityRepository;
use crate::transaction::TransactionalExecutor;

/// Path that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use stockroom_db::DbConfig;
///
/// let config = DbConfig::new("./stockroom.db")
///     .max_connections(8)
///     .query_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_connections, 8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long a checkout waits for a free connection.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Deadline given to contexts from [`Database::context`].
    /// Default: none
    pub query_timeout: Option<Duration>,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            query_timeout: None,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the checkout timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets the default per-request deadline.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// One connection only: every connection to `:memory:` would otherwise
    /// see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            query_timeout: None,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap; clones share one pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::in_memory()).await?;
/// let ctx = db.context();
///
/// let query = ListQuery::from_pairs([("name", "~sw~cola"), ("sort", "id,desc")])?;
/// let page = db.products().list(&ctx, &query).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    query_timeout: Option<Duration>,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures every pooled connection (WAL, NORMAL sync, foreign keys)
    /// 3. Creates the bounded connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError)` - Connection or migration failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            // In-memory data lives only as long as its connection.
            .idle_timeout((!config.is_in_memory()).then_some(config.idle_timeout))
            .max_lifetime((!config.is_in_memory()).then_some(Duration::from_secs(1800)))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            query_timeout: config.query_timeout,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent; called by `new()` when `run_migrations` is set.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns (total, applied) migration counts.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer repository methods; writes should go through [`Self::executor`].
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A fresh request context carrying the configured default deadline.
    pub fn context(&self) -> QueryContext {
        match self.query_timeout {
            Some(timeout) => QueryContext::with_timeout(timeout),
            None => QueryContext::new(),
        }
    }

    /// Checks a connection out of the pool.
    ///
    /// The connection goes back to the pool when dropped.
    ///
    /// ## Errors
    /// * `PoolExhausted` - no connection freed up within `acquire_timeout`
    /// * `Timeout` - the context deadline passed first
    pub async fn checkout(&self, ctx: &QueryContext) -> DbResult<PoolConnection<Sqlite>> {
        checkout_from(&self.pool, ctx).await
    }

    /// Returns the transactional write executor.
    pub fn executor(&self) -> TransactionalExecutor {
        TransactionalExecutor::new(self.pool.clone())
    }

    pub fn products(&self) -> EntityRepository<Product> {
        EntityRepository::new(self.pool.clone())
    }

    pub fn storages(&self) -> EntityRepository<Storage> {
        EntityRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> EntityRepository<Supplier> {
        EntityRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> EntityRepository<User> {
        EntityRepository::new(self.pool.clone())
    }

    pub fn stocks(&self) -> EntityRepository<Stock> {
        EntityRepository::new(self.pool.clone())
    }

    pub fn validities(&self) -> EntityRepository<Validity> {
        EntityRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Takes a connection from `pool`, bounded by both `acquire_timeout` and the
/// context deadline. Shared by [`Database::checkout`] and the write executor.
pub(crate) async fn checkout_from(
    pool: &SqlitePool,
    ctx: &QueryContext,
) -> DbResult<PoolConnection<Sqlite>> {
    debug!(
        request_id = %ctx.request_id(),
        idle = pool.num_idle(),
        size = pool.size(),
        "Checking out connection"
    );
    ctx.run("checkout", pool.acquire()).await
}

// =============================================================================
// Unit Tests
// =============================================================================
