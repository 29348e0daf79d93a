//! # Entity Repository
//!
//! One generic repository for every table-backed entity. Reads compile the
//! request through the core query compiler; writes go through the
//! [`TransactionalExecutor`].
//!
//! ## List Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ListQuery { filters, sort, page }                                      │
//! │       │                                                                 │
//! │       ├── PredicateBuilder (allowed = E::FILTERABLE) ──► WHERE ...      │
//! │       ├── compile_order(sort or "id ASC")            ──► ORDER BY ...   │
//! │       └── PageRequest                                ──► LIMIT / OFFSET │
//! │                                                                         │
//! │  SELECT COUNT(*) FROM t [WHERE ...]                          → total    │
//! │  SELECT cols FROM t [WHERE ...] ORDER BY ... LIMIT ? OFFSET ? → items   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use stockroom_core::query::{
    compile_order, FilterClause, ListQuery, Page, PredicateBuilder, RawParameterMap,
    SortDirection, SortSpec, SqliteEscaper,
};
use stockroom_core::Entity;

use crate::context::QueryContext;
use crate::error::{DbError, DbResult};
use crate::transaction::{TransactionalExecutor, WriteStatement};

/// Per-entity INSERT and UPDATE statements.
///
/// `update_statement` binds the id as `?1`.
pub trait EntityStatements: Entity {
    fn insert_statement(&self) -> WriteStatement;

    fn update_statement(&self) -> WriteStatement;
}

/// Result of [`EntityRepository::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The stored row already matched; nothing was written.
    Unchanged,
    Updated,
}

/// Repository for one entity type.
pub struct EntityRepository<E> {
    pool: SqlitePool,
    executor: TransactionalExecutor,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        EntityRepository {
            pool: self.pool.clone(),
            executor: self.executor.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("entity", &E::NAME)
            .finish()
    }
}

impl<E> EntityRepository<E>
where
    E: Entity + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(pool: SqlitePool) -> Self {
        EntityRepository {
            executor: TransactionalExecutor::new(pool.clone()),
            pool,
            _entity: PhantomData,
        }
    }

    /// Sort used when a request names none.
    pub fn default_sort() -> SortSpec {
        SortSpec::single("id", SortDirection::Asc)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn executor(&self) -> &TransactionalExecutor {
        &self.executor
    }

    pub(crate) fn select_sql() -> String {
        format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }

    /// Compiles `filters` against this entity's filterable columns.
    pub fn compile_filter(filters: &RawParameterMap) -> DbResult<Option<FilterClause>> {
        let clause = PredicateBuilder::new(&SqliteEscaper)
            .allow_fields(E::NAME, E::FILTERABLE)
            .build(filters)?;
        Ok(clause)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists one page of rows matching `query`.
    ///
    /// ## Returns
    /// * `Ok(Page)` - items for the page plus the total behind the filter
    /// * `Err(InvalidQuery)` - a filter or sort names an unknown field
    pub async fn list(&self, ctx: &QueryContext, query: &ListQuery) -> DbResult<Page<E>> {
        let filter = Self::compile_filter(&query.filters)?;
        let where_sql = filter
            .as_ref()
            .map(FilterClause::to_where_sql)
            .unwrap_or_default();

        let sort = query.sort.or_else(Self::default_sort());
        let order = compile_order(&sort, Some(E::FILTERABLE))?;

        let mut sql = format!("{}{}", Self::select_sql(), where_sql);
        if let Some(order) = order {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        sql.push_str(" LIMIT ? OFFSET ?");

        debug!(
            request_id = %ctx.request_id(),
            entity = E::NAME,
            filter = filter.as_ref().map(FilterClause::as_str).unwrap_or(""),
            page = query.page.page(),
            limit = query.page.limit(),
            "Listing"
        );

        let total = self.count_where(ctx, &where_sql).await?;
        let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);

        let items = ctx
            .run(
                "list",
                sqlx::query_as::<_, E>(&sql)
                    .bind(i64::from(query.page.limit()))
                    .bind(offset)
                    .fetch_all(&self.pool),
            )
            .await?;

        debug!(count = items.len(), total, "List returned rows");
        Ok(Page::new(items, query.page, total))
    }

    /// Counts rows matching `filters`.
    pub async fn count(&self, ctx: &QueryContext, filters: &RawParameterMap) -> DbResult<u64> {
        let where_sql = Self::compile_filter(filters)?
            .as_ref()
            .map(FilterClause::to_where_sql)
            .unwrap_or_default();
        self.count_where(ctx, &where_sql).await
    }

    async fn count_where(&self, ctx: &QueryContext, where_sql: &str) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", E::TABLE, where_sql);
        let total = ctx
            .run("count", sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool))
            .await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// Gets a row by id.
    ///
    /// ## Returns
    /// * `Ok(Some(E))` - Row found
    /// * `Ok(None)` - No such row
    pub async fn get(&self, ctx: &QueryContext, id: i64) -> DbResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1", Self::select_sql());
        ctx.run(
            "get",
            sqlx::query_as::<_, E>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await
    }

    /// Gets a row by id, failing with `NotFound` when it is absent.
    pub async fn find_by_id(&self, ctx: &QueryContext, id: i64) -> DbResult<E> {
        self.get(ctx, id)
            .await?
            .ok_or_else(|| DbError::not_found(E::NAME, id))
    }

    pub async fn exists(&self, ctx: &QueryContext, id: i64) -> DbResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", E::TABLE);
        let found = ctx
            .run(
                "exists",
                sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(&self.pool),
            )
            .await?;
        Ok(found)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Deletes a row by id.
    ///
    /// ## Returns
    /// * `Ok(())` - Row deleted
    /// * `Err(DbError::NotFound)` - No such row; nothing changed
    pub async fn delete(&self, ctx: &QueryContext, id: i64) -> DbResult<()> {
        debug!(request_id = %ctx.request_id(), entity = E::NAME, id, "Deleting");

        let statement = WriteStatement::new(format!("DELETE FROM {} WHERE id = ?1", E::TABLE))
            .bind(id)
            .expect_rows(E::NAME, id);
        self.executor.execute(ctx, statement).await?;
        Ok(())
    }
}

impl<E> EntityRepository<E>
where
    E: EntityStatements + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    /// Validates and inserts `entity`, returning the stored row.
    ///
    /// The `id` of `entity` is ignored; the database assigns one.
    pub async fn insert(&self, ctx: &QueryContext, entity: &E) -> DbResult<E> {
        entity.validate()?;
        debug!(request_id = %ctx.request_id(), entity = E::NAME, "Inserting");

        let outcome = self.executor.execute(ctx, entity.insert_statement()).await?;
        self.find_by_id(ctx, outcome.last_insert_id).await
    }

    /// Validates and updates `entity`.
    ///
    /// ## Returns
    /// * `Ok(Unchanged)` - the stored row already equals `entity`
    /// * `Ok(Updated)` - the row was rewritten
    /// * `Err(DbError::NotFound)` - no row with that id
    pub async fn update(&self, ctx: &QueryContext, entity: &E) -> DbResult<UpdateOutcome> {
        entity.validate()?;

        let stored = self.find_by_id(ctx, entity.id()).await?;
        if stored.same_record(entity) {
            debug!(entity = E::NAME, id = entity.id(), "Update is a no-op");
            return Ok(UpdateOutcome::Unchanged);
        }

        debug!(request_id = %ctx.request_id(), entity = E::NAME, id = entity.id(), "Updating");
        let statement = entity.update_statement().expect_rows(E::NAME, entity.id());
        self.executor.execute(ctx, statement).await?;
        Ok(UpdateOutcome::Updated)
    }
}
