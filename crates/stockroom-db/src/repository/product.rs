//! # Product Repository
//!
//! Statements for the `products` table.

use chrono::Utc;

use stockroom_core::Product;

use super::entity::{EntityRepository, EntityStatements};
use crate::transaction::WriteStatement;

/// Repository for [`Product`] rows.
pub type ProductRepository = EntityRepository<Product>;

impl EntityStatements for Product {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            INSERT INTO products (
                name, description, lowest_price, highest_price,
                supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&self.name)
        .bind(self.description.clone())
        .bind(self.lowest_price)
        .bind(self.highest_price)
        .bind(self.supplier_id)
        .bind(self.created_at)
        .bind(self.updated_at)
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                lowest_price = ?4,
                highest_price = ?5,
                supplier_id = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.description.clone())
        .bind(self.lowest_price)
        .bind(self.highest_price)
        .bind(self.supplier_id)
        .bind(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::QueryContext;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::UpdateOutcome;
    use stockroom_core::query::{ListQuery, PageRequest, RawParameterMap, SortDirection, SortSpec};
    use stockroom_core::{CoreError, Supplier};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(db: &Database, ctx: &QueryContext) {
        let products = db.products();
        for (name, description, low, high) in [
            ("Sandpaper", "abstracted", 100, 150),
            ("Router", "abc", 300, 420),
            ("Hammer", "xyz", 50, 60),
            ("Clamp", "ab only", 280, 300),
        ] {
            products
                .insert(ctx, &Product::draft(name, low, high).with_description(description))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let db = setup().await;
        let ctx = QueryContext::new();

        let stored = db
            .products()
            .insert(&ctx, &Product::draft("Cola", 120, 150))
            .await
            .unwrap();

        assert!(stored.id > 0);
        assert_eq!(stored.name, "Cola");
        assert_eq!(stored.description, None);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_prices() {
        let db = setup().await;
        let ctx = QueryContext::new();

        let err = db
            .products()
            .insert(&ctx, &Product::draft("Cola", 200, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidEntity(_)));
        assert_eq!(db.products().count(&ctx, &RawParameterMap::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_with_grouped_filters() {
        let db = setup().await;
        let ctx = QueryContext::new();
        seed(&db, &ctx).await;

        let query = ListQuery::from_pairs([
            ("description[]", "~sw~ab"),
            ("description[]", "~ew~ted"),
            ("lowest_price", "~gt~280"),
            ("opmodeor", "true"),
        ])
        .unwrap();

        let page = db.products().list(&ctx, &query).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(page.total, 2);
        assert_eq!(names, vec!["Sandpaper", "Router"]);
    }

    #[tokio::test]
    async fn test_list_pages_and_sorts() {
        let db = setup().await;
        let ctx = QueryContext::new();
        seed(&db, &ctx).await;

        let query = ListQuery::new()
            .with_sort(SortSpec::single("lowest_price", SortDirection::Desc))
            .with_page(PageRequest::new(2, 3).unwrap());

        let page = db.products().list(&ctx, &query).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Hammer");
        assert!(!page.has_next());

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], 4);
        assert_eq!(json["page"], 2);
        assert_eq!(json["items"][0]["name"], "Hammer");
    }

    #[tokio::test]
    async fn test_unknown_filter_field_is_rejected() {
        let db = setup().await;
        let ctx = QueryContext::new();

        let query = ListQuery::new().with_filter("colour", "red");
        let err = db.products().list(&ctx, &query).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(CoreError::UnknownField { .. })));

        let query = ListQuery::new().with_sort(SortSpec::single("colour", SortDirection::Asc));
        assert!(db.products().list(&ctx, &query).await.is_err());
    }

    #[tokio::test]
    async fn test_quotes_in_filter_are_escaped() {
        let db = setup().await;
        let ctx = QueryContext::new();
        db.products()
            .insert(&ctx, &Product::draft("O'Brien's glue", 10, 20))
            .await
            .unwrap();

        let query = ListQuery::new().with_filter("name", "~sw~O'Brien");
        let page = db.products().list(&ctx, &query).await.unwrap();
        assert_eq!(page.total, 1);

        let query = ListQuery::new().with_filter("name", "x' OR '1'='1");
        assert_eq!(db.products().list(&ctx, &query).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_update_and_noop_update() {
        let db = setup().await;
        let ctx = QueryContext::new();
        let products = db.products();

        let stored = products
            .insert(&ctx, &Product::draft("Cola", 120, 150))
            .await
            .unwrap();
        assert_eq!(products.update(&ctx, &stored).await.unwrap(), UpdateOutcome::Unchanged);

        let changed = Product {
            highest_price: 180,
            ..stored.clone()
        };
        assert_eq!(products.update(&ctx, &changed).await.unwrap(), UpdateOutcome::Updated);
        assert_eq!(products.find_by_id(&ctx, stored.id).await.unwrap().highest_price, 180);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let db = setup().await;
        let ctx = QueryContext::new();

        let ghost = Product {
            id: 99,
            ..Product::draft("Ghost", 1, 2)
        };
        assert!(db.products().update(&ctx, &ghost).await.unwrap_err().is_not_found());
        assert!(db.products().delete(&ctx, 99).await.unwrap_err().is_not_found());
        assert!(db.products().get(&ctx, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_by_supplier() {
        let db = setup().await;
        let ctx = QueryContext::new();

        let supplier = db
            .suppliers()
            .insert(&ctx, &Supplier::draft("Acme"))
            .await
            .unwrap();
        db.products()
            .insert(&ctx, &Product::draft("Anvil", 500, 900).with_supplier(supplier.id))
            .await
            .unwrap();
        db.products()
            .insert(&ctx, &Product::draft("Rope", 5, 9))
            .await
            .unwrap();

        let query = ListQuery::new().with_filter("supplier_id", supplier.id.to_string());
        let page = db.products().list(&ctx, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Anvil");
    }
}
