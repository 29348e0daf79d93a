//! Statements for the `storages` table.

use stockroom_core::Storage;

use super::entity::{EntityRepository, EntityStatements};
use crate::transaction::WriteStatement;

/// Repository for [`Storage`] rows.
pub type StorageRepository = EntityRepository<Storage>;

impl EntityStatements for Storage {
    fn insert_statement(&self) -> WriteStatement {
        WriteStatement::new("INSERT INTO storages (name, address) VALUES (?1, ?2)")
            .bind(&self.name)
            .bind(self.address.clone())
    }

    fn update_statement(&self) -> WriteStatement {
        WriteStatement::new("UPDATE storages SET name = ?2, address = ?3 WHERE id = ?1")
            .bind(self.id)
            .bind(&self.name)
            .bind(self.address.clone())
    }
}
