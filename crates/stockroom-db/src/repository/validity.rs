//! # Validity Repository
//!
//! Expiration batches. Dates are stored as `YYYY-MM-DD` text, so the
//! compiled date filters compare correctly as strings.

use chrono::NaiveDate;

use stockroom_core::query::{ListQuery, Page, PageRequest, SortDirection, SortSpec};
use stockroom_core::Validity;

use super::entity::{EntityRepository, EntityStatements};
use crate::context::QueryContext;
use crate::error::DbResult;
use crate::transaction::WriteStatement;

/// Repository for [`Validity`] rows.
pub type ValidityRepository = EntityRepository<Validity>;

impl EntityStatements for Validity {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            INSERT INTO validities (product_id, storage_id, expiration_date, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(self.product_id)
        .bind(self.storage_id)
        .bind(self.expiration_date)
        .bind(self.quantity)
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            UPDATE validities SET
                product_id = ?2,
                storage_id = ?3,
                expiration_date = ?4,
                quantity = ?5
            WHERE id = ?1
            "#,
        )
        .bind(self.id)
        .bind(self.product_id)
        .bind(self.storage_id)
        .bind(self.expiration_date)
        .bind(self.quantity)
    }
}

impl EntityRepository<Validity> {
    /// Batches expiring strictly before `day`, soonest first.
    pub async fn expiring_before(
        &self,
        ctx: &QueryContext,
        day: NaiveDate,
        page: PageRequest,
    ) -> DbResult<Page<Validity>> {
        let mut sort = SortSpec::single("expiration_date", SortDirection::Asc);
        sort.push("id", SortDirection::Asc);

        let query = ListQuery::new()
            .with_filter("expiration_date", format!("~lt~{}", day.format("%Y-%m-%d")))
            .with_sort(sort)
            .with_page(page);

        self.list(ctx, &query).await
    }
}
