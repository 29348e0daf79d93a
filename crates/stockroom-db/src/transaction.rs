//! # Transactional Write Executor
//!
//! Every create, update and delete goes through here.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout ──► BEGIN ──► statement 1 ──► ... ──► statement n ──► COMMIT  │
//! │                             │                        │            │     │
//! │                             │ SQL error              │            ▼     │
//! │                             ▼                        │        outcomes  │
//! │                         ROLLBACK ◄───────────────────┘                  │
//! │                             │    zero rows where rows were required     │
//! │                             ▼                                           │
//! │      TransactionFailed(cause)   or   NotFound { entity, id }            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Zero affected rows is not a SQL error. A statement that must touch a row
//! says so with [`WriteStatement::expect_rows`]; otherwise the caller reads
//! [`WriteOutcome::rows_affected`] itself. Transactions are never nested and
//! never retried.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult};
use sqlx::{Connection, Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::context::QueryContext;
use crate::error::{DbError, DbResult};
use crate::pool::checkout_from;

// =============================================================================
// Statement Values
// =============================================================================

/// A value bound to a `?N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::DateTime(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

// =============================================================================
// Write Statement
// =============================================================================

/// One parameterized write plus its row requirement.
#[derive(Debug, Clone)]
pub struct WriteStatement {
    sql: String,
    args: Vec<SqlValue>,
    required: Option<(String, String)>,
}

impl WriteStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        WriteStatement {
            sql: sql.into(),
            args: Vec::new(),
            required: None,
        }
    }

    /// Binds the next placeholder.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Requires at least one affected row. Zero rows rolls the whole
    /// transaction back and returns `NotFound { entity, id }`.
    pub fn expect_rows(mut self, entity: impl Into<String>, id: impl ToString) -> Self {
        self.required = Some((entity.into(), id.to_string()));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    fn query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for arg in &self.args {
            query = match arg {
                SqlValue::Null => query.bind(None::<i64>),
                SqlValue::Int(v) => query.bind(*v),
                SqlValue::Float(v) => query.bind(*v),
                SqlValue::Bool(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.as_str()),
                SqlValue::Date(v) => query.bind(*v),
                SqlValue::DateTime(v) => query.bind(*v),
            };
        }
        query
    }
}

/// What one committed statement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: u64,
    /// Rowid of the last insert on the connection (0 if none).
    pub last_insert_id: i64,
}

impl WriteOutcome {
    fn from_result(result: &SqliteQueryResult) -> Self {
        WriteOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        }
    }

    /// Turns a zero-row outcome into `NotFound`.
    pub fn ensure_affected(self, entity: &str, id: impl ToString) -> DbResult<Self> {
        if self.rows_affected == 0 {
            return Err(DbError::not_found(entity, id));
        }
        Ok(self)
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs writes in explicit transactions on pooled connections.
///
/// ## Usage
/// ```rust,ignore
/// let outcome = db
///     .executor()
///     .execute(&ctx, WriteStatement::new("DELETE FROM storages WHERE id = ?1").bind(3))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionalExecutor {
    pool: SqlitePool,
}

impl TransactionalExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionalExecutor { pool }
    }

    /// Runs one statement in its own transaction.
    pub async fn execute(
        &self,
        ctx: &QueryContext,
        statement: WriteStatement,
    ) -> DbResult<WriteOutcome> {
        let outcomes = self.execute_all(ctx, std::slice::from_ref(&statement)).await?;
        outcomes
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Internal("transaction produced no outcome".to_string()))
    }

    /// Runs `statements` in order inside one transaction.
    ///
    /// ## Returns
    /// * `Ok(outcomes)` - all statements ran and the transaction committed
    /// * `Err(NotFound)` - a statement with a row requirement touched no row
    /// * `Err(TransactionFailed)` - a statement or COMMIT failed
    /// * `Err(Timeout)` - the context deadline passed
    ///
    /// Every error path rolls back first, so nothing is partially applied.
    pub async fn execute_all(
        &self,
        ctx: &QueryContext,
        statements: &[WriteStatement],
    ) -> DbResult<Vec<WriteOutcome>> {
        let mut conn: PoolConnection<Sqlite> = checkout_from(&self.pool, ctx).await?;
        let mut tx = ctx.run("begin", Connection::begin(&mut *conn)).await?;

        debug!(
            request_id = %ctx.request_id(),
            statements = statements.len(),
            "Transaction started"
        );

        let mut outcomes = Vec::with_capacity(statements.len());

        for (index, statement) in statements.iter().enumerate() {
            let outcome = match ctx.run("statement", statement.query().execute(&mut *tx)).await {
                Ok(result) => WriteOutcome::from_result(&result),
                Err(err) => {
                    warn!(
                        request_id = %ctx.request_id(),
                        index,
                        error = %err,
                        "Statement failed, rolling back"
                    );
                    rollback(ctx, tx).await;
                    return Err(match err {
                        DbError::Timeout { .. } => err,
                        other => DbError::transaction_failed(other),
                    });
                }
            };

            if let Some((entity, id)) = &statement.required {
                if outcome.rows_affected == 0 {
                    debug!(
                        request_id = %ctx.request_id(),
                        index,
                        entity = %entity,
                        id = %id,
                        "No rows affected, rolling back"
                    );
                    rollback(ctx, tx).await;
                    return Err(DbError::not_found(entity.as_str(), id));
                }
            }

            outcomes.push(outcome);
        }

        match ctx.run("commit", tx.commit()).await {
            Ok(()) => {
                debug!(request_id = %ctx.request_id(), "Transaction committed");
                Ok(outcomes)
            }
            // A dropped, uncommitted transaction is rolled back by the driver.
            Err(err @ DbError::Timeout { .. }) => Err(err),
            Err(err) => Err(DbError::transaction_failed(err)),
        }
    }
}

async fn rollback(ctx: &QueryContext, tx: Transaction<'_, Sqlite>) {
    match tx.rollback().await {
        Ok(()) => debug!(request_id = %ctx.request_id(), "Transaction rolled back"),
        Err(err) => warn!(request_id = %ctx.request_id(), error = %err, "Rollback failed"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::time::Duration;

    async fn setup() -> (Database, TransactionalExecutor) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let executor = db.executor();
        (db, executor)
    }

    async fn storage_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM storages")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn insert_storage(name: &str) -> WriteStatement {
        WriteStatement::new("INSERT INTO storages (name, address) VALUES (?1, ?2)")
            .bind(name)
            .bind(None::<String>)
    }

    #[tokio::test]
    async fn test_commit_returns_outcomes() {
        let (db, executor) = setup().await;
        let ctx = QueryContext::new();

        let outcome = executor.execute(&ctx, insert_storage("North")).await.unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert!(outcome.last_insert_id > 0);
        assert_eq!(storage_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_sql_error_rolls_back_every_statement() {
        let (db, executor) = setup().await;
        let ctx = QueryContext::new();

        let result = executor
            .execute_all(
                &ctx,
                &[
                    insert_storage("North"),
                    WriteStatement::new("INSERT INTO no_such_table (x) VALUES (1)"),
                ],
            )
            .await;

        assert!(matches!(result, Err(DbError::TransactionFailed(_))));
        assert_eq!(storage_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_zero_rows_is_distinct_from_transaction_failure() {
        let (db, executor) = setup().await;
        let ctx = QueryContext::new();

        // Without a requirement the caller just sees zero rows.
        let outcome = executor
            .execute(&ctx, WriteStatement::new("DELETE FROM storages WHERE id = ?1").bind(42))
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 0);
        assert!(outcome.ensure_affected("Storage", 42).unwrap_err().is_not_found());

        // With a requirement earlier statements are rolled back as well.
        let result = executor
            .execute_all(
                &ctx,
                &[
                    insert_storage("North"),
                    WriteStatement::new("DELETE FROM storages WHERE id = ?1")
                        .bind(42)
                        .expect_rows("Storage", 42),
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(DbError::NotFound { ref entity, ref id }) if entity == "Storage" && id == "42"
        ));
        assert_eq!(storage_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_constraint_violation_is_wrapped() {
        let (_db, executor) = setup().await;
        let ctx = QueryContext::new();

        let err = executor
            .execute(
                &ctx,
                WriteStatement::new(
                    "INSERT INTO stocks (product_id, storage_id, quantity) VALUES (?1, ?2, ?3)",
                )
                .bind(999)
                .bind(999)
                .bind(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::TransactionFailed(_)));
        assert!(matches!(err.root_cause(), DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_expired_deadline_writes_nothing() {
        let (db, executor) = setup().await;
        let ctx = QueryContext::with_timeout(Duration::ZERO);

        let err = executor.execute(&ctx, insert_storage("North")).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(storage_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_connection_returns_to_pool() {
        let (db, executor) = setup().await;
        let ctx = QueryContext::new();

        // The in-memory pool holds one connection; each call must give it back.
        for name in ["A", "B", "C"] {
            executor.execute(&ctx, insert_storage(name)).await.unwrap();
        }
        let _ = executor
            .execute(&ctx, WriteStatement::new("INSERT INTO nowhere VALUES (1)"))
            .await;
        executor.execute(&ctx, insert_storage("D")).await.unwrap();

        assert_eq!(storage_count(&db).await, 4);
    }

    #[tokio::test]
    async fn test_held_connection_bounds_writes() {
        let config = DbConfig::in_memory().acquire_timeout(Duration::from_millis(100));
        let db = Database::new(config).await.unwrap();
        let executor = db.executor();
        let ctx = QueryContext::new();

        let held = db.checkout(&ctx).await.unwrap();
        let err = executor
            .execute(&ctx, insert_storage("Blocked"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::PoolExhausted));

        drop(held);
        executor.execute(&ctx, insert_storage("Free")).await.unwrap();
        assert_eq!(storage_count(&db).await, 1);
    }

    #[test]
    fn test_option_binds_null() {
        let statement = WriteStatement::new("UPDATE x SET a = ?1, b = ?2")
            .bind(None::<i64>)
            .bind(Some("v"));
        assert_eq!(
            statement.args(),
            &[SqlValue::Null, SqlValue::Text("v".to_string())]
        );
    }
}
