//! # Stock Repository
//!
//! Quantities per (product, storage) pair.
//!
//! ## Transfer
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transfer(product, from, to, qty)                                       │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE stocks SET quantity = quantity - qty  (from; must hit a row)  │
//! │    INSERT ... ON CONFLICT DO UPDATE quantity + qty          (to)        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  quantity < 0 trips CHECK (quantity >= 0) → whole transfer rolls back   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use stockroom_core::{Entity, Stock, ValidationError};

use super::entity::{EntityRepository, EntityStatements};
use crate::context::QueryContext;
use crate::error::DbResult;
use crate::transaction::WriteStatement;

/// Repository for [`Stock`] rows.
pub type StockRepository = EntityRepository<Stock>;

impl EntityStatements for Stock {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new(
            "INSERT INTO stocks (product_id, storage_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(self.product_id)
        .bind(self.storage_id)
        .bind(self.quantity)
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new(
            "UPDATE stocks SET product_id = ?2, storage_id = ?3, quantity = ?4 WHERE id = ?1",
        )
        .bind(self.id)
        .bind(self.product_id)
        .bind(self.storage_id)
        .bind(self.quantity)
    }
}

fn pair_key(product_id: i64, storage_id: i64) -> String {
    format!("product {} in storage {}", product_id, storage_id)
}

fn upsert_add(product_id: i64, storage_id: i64, quantity: i64) -> WriteStatement {
    WriteStatement::new(
        r#"
        INSERT INTO stocks (product_id, storage_id, quantity) VALUES (?1, ?2, ?3)
        ON CONFLICT(product_id, storage_id)
        DO UPDATE SET quantity = quantity + excluded.quantity
        "#,
    )
    .bind(product_id)
    .bind(storage_id)
    .bind(quantity)
}

fn decrement(product_id: i64, storage_id: i64, quantity: i64) -> WriteStatement {
    WriteStatement::new(
        "UPDATE stocks SET quantity = quantity - ?3 WHERE product_id = ?1 AND storage_id = ?2",
    )
    .bind(product_id)
    .bind(storage_id)
    .bind(quantity)
    .expect_rows(Stock::NAME, pair_key(product_id, storage_id))
}

impl EntityRepository<Stock> {
    /// Stock row for one product in one storage.
    pub async fn find_for(
        &self,
        ctx: &QueryContext,
        product_id: i64,
        storage_id: i64,
    ) -> DbResult<Option<Stock>> {
        let sql = format!(
            "{} WHERE product_id = ?1 AND storage_id = ?2",
            Self::select_sql()
        );
        ctx.run(
            "find_stock",
            sqlx::query_as::<_, Stock>(&sql)
                .bind(product_id)
                .bind(storage_id)
                .fetch_optional(self.pool()),
        )
        .await
    }

    /// Sets the quantity for a pair, creating the row when missing.
    pub async fn set_quantity(
        &self,
        ctx: &QueryContext,
        product_id: i64,
        storage_id: i64,
        quantity: i64,
    ) -> DbResult<()> {
        Stock::draft(product_id, storage_id, quantity).validate()?;

        let statement = WriteStatement::new(
            r#"
            INSERT INTO stocks (product_id, storage_id, quantity) VALUES (?1, ?2, ?3)
            ON CONFLICT(product_id, storage_id)
            DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(product_id)
        .bind(storage_id)
        .bind(quantity);

        self.executor().execute(ctx, statement).await?;
        debug!(product_id, storage_id, quantity, "Stock quantity set");
        Ok(())
    }

    /// Adds `delta` (possibly negative) to an existing pair.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - no stock row for the pair
    /// * `Err(TransactionFailed)` - the result would be negative
    pub async fn adjust(
        &self,
        ctx: &QueryContext,
        product_id: i64,
        storage_id: i64,
        delta: i64,
    ) -> DbResult<()> {
        let statement = WriteStatement::new(
            "UPDATE stocks SET quantity = quantity + ?3 WHERE product_id = ?1 AND storage_id = ?2",
        )
        .bind(product_id)
        .bind(storage_id)
        .bind(delta)
        .expect_rows(Stock::NAME, pair_key(product_id, storage_id));

        self.executor().execute(ctx, statement).await?;
        Ok(())
    }

    /// Moves `quantity` units of a product between two storages atomically.
    pub async fn transfer(
        &self,
        ctx: &QueryContext,
        product_id: i64,
        from_storage: i64,
        to_storage: i64,
        quantity: i64,
    ) -> DbResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if from_storage == to_storage {
            return Err(ValidationError::InvalidFormat {
                field: "to_storage".to_string(),
                reason: "must differ from the source storage".to_string(),
            }
            .into());
        }

        self.executor()
            .execute_all(
                ctx,
                &[
                    decrement(product_id, from_storage, quantity),
                    upsert_add(product_id, to_storage, quantity),
                ],
            )
            .await?;

        info!(
            request_id = %ctx.request_id(),
            product_id,
            from_storage,
            to_storage,
            quantity,
            "Stock transferred"
        );
        Ok(())
    }
}
