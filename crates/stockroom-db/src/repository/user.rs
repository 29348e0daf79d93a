//! # User Repository
//!
//! Statements for the `users` table. Passwords arrive already hashed;
//! this layer only stores the hash.

use tracing::debug;

use stockroom_core::{Entity, User};

use super::entity::{EntityRepository, EntityStatements};
use crate::context::QueryContext;
use crate::error::DbResult;
use crate::transaction::WriteStatement;

/// Repository for [`User`] rows.
pub type UserRepository = EntityRepository<User>;

impl EntityStatements for User {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            INSERT INTO users (username, email, password_hash, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&self.username)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(self.role.as_str())
        .bind(self.is_active)
        .bind(self.created_at)
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new(
            r#"
            UPDATE users SET
                username = ?2,
                email = ?3,
                password_hash = ?4,
                role = ?5,
                is_active = ?6
            WHERE id = ?1
            "#,
        )
        .bind(self.id)
        .bind(&self.username)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(self.role.as_str())
        .bind(self.is_active)
    }
}

impl EntityRepository<User> {
    /// Looks a user up by exact username.
    pub async fn find_by_username(
        &self,
        ctx: &QueryContext,
        username: &str,
    ) -> DbResult<Option<User>> {
        debug!(username = %username, "Looking up user");

        let sql = format!("{} WHERE username = ?1", Self::select_sql());
        ctx.run(
            "find_by_username",
            sqlx::query_as::<_, User>(&sql)
                .bind(username)
                .fetch_optional(self.pool()),
        )
        .await
    }

    /// Marks a user inactive without deleting the row.
    pub async fn deactivate(&self, ctx: &QueryContext, id: i64) -> DbResult<()> {
        let statement = WriteStatement::new("UPDATE users SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .expect_rows(User::NAME, id);
        self.executor().execute(ctx, statement).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::query::RawParameterMap;
    use stockroom_core::{CoreError, UserRole};

    fn ann() -> User {
        User::draft("ann", "ann@example.com", "$argon2id$v=19$hash", UserRole::Manager)
    }

    #[tokio::test]
    async fn test_insert_and_find_by_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        let stored = db.users().insert(&ctx, &ann()).await.unwrap();
        assert_eq!(stored.role, UserRole::Manager);
        assert!(stored.is_active);

        let found = db.users().find_by_username(&ctx, "ann").await.unwrap().unwrap();
        assert_eq!(found.id, stored.id);
        assert!(db.users().find_by_username(&ctx, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        db.users().insert(&ctx, &ann()).await.unwrap();
        let other_ann =
            User::draft("ann", "ann.other@example.com", "$argon2id$v=19$hash", UserRole::Clerk);
        let err = db.users().insert(&ctx, &other_ann).await.unwrap_err();

        assert!(matches!(err, DbError::TransactionFailed(_)));
        assert!(matches!(
            err.root_cause(),
            DbError::UniqueViolation { field } if field == "username"
        ));
        assert!(!err.to_string().contains("unknown"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        db.users().insert(&ctx, &ann()).await.unwrap();
        let bob = User::draft("bob", "ann@example.com", "$argon2id$v=19$hash", UserRole::Clerk);
        let err = db.users().insert(&ctx, &bob).await.unwrap_err();

        assert!(matches!(
            err.root_cause(),
            DbError::UniqueViolation { field } if field == "email"
        ));
        assert_eq!(
            err.root_cause().to_string(),
            "Duplicate email: value already exists"
        );
        assert_eq!(db.users().count(&ctx, &RawParameterMap::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_and_filter_by_flag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        let stored = db.users().insert(&ctx, &ann()).await.unwrap();
        db.users().deactivate(&ctx, stored.id).await.unwrap();

        let inactive = RawParameterMap::new().with("is_active", "false");
        assert_eq!(db.users().count(&ctx, &inactive).await.unwrap(), 1);
        assert!(db.users().deactivate(&ctx, 404).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_password_hash_is_not_filterable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = QueryContext::new();

        let by_hash = RawParameterMap::new().with("password_hash", "~sw~$argon");
        let err = db.users().count(&ctx, &by_hash).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(CoreError::UnknownField { .. })));
    }
}
