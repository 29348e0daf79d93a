//! Statements for the `suppliers` table.

use stockroom_core::Supplier;

use super::entity::{EntityRepository, EntityStatements};
use crate::transaction::WriteStatement;

/// Repository for [`Supplier`] rows.
pub type SupplierRepository = EntityRepository<Supplier>;

impl EntityStatements for Supplier {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new("INSERT INTO suppliers (name, email, phone) VALUES (?1, ?2, ?3)")
            .bind(&self.name)
            .bind(self.email.clone())
            .bind(self.phone.clone())
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new("UPDATE suppliers SET name = ?2, email = ?3, phone = ?4 WHERE id = ?1")
            .bind(self.id)
            .bind(&self.name)
            .bind(self.email.clone())
            .bind(self.phone.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::QueryContext;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::Product;

    #[tokio::test]
    async fn test_invalid_email_never_reaches_sql() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        let err = db
            .suppliers()
            .insert(&ctx, &Supplier::draft("Acme").with_email("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidEntity(_)));
    }

    #[tokio::test]
    async fn test_deleting_supplier_detaches_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        let supplier = db
            .suppliers()
            .insert(&ctx, &Supplier::draft("Acme").with_phone("555-0100"))
            .await
            .unwrap();
        let product = db
            .products()
            .insert(&ctx, &Product::draft("Anvil", 500, 900).with_supplier(supplier.id))
            .await
            .unwrap();

        db.suppliers().delete(&ctx, supplier.id).await.unwrap();

        let product = db.products().find_by_id(&ctx, product.id).await.unwrap();
        assert_eq!(product.supplier_id, None);
    }
}
