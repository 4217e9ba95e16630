// ABOUTME: Capability traits for the source and destination storage engines
// ABOUTME: The orchestration core only ever talks to these interfaces

use anyhow::Result;
use async_trait::async_trait;

/// A table's on-disk footprint, as reported by the source catalog.
#[derive(Debug, Clone)]
pub struct TableSize {
    pub name: String,
    pub bytes: i64,
}

/// Operations the migrator needs from the source database.
///
/// `lock_for_export` must cover the whole batch in a single request so there
/// is never a window where some tables are copy-safe and others are not.
/// `unlock_all` must run on the same session that took the lock.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// The authoritative creation statement for one table.
    async fn create_statement(&self, table: &str) -> Result<String>;

    async fn lock_for_export(&self, tables: &[String]) -> Result<()>;

    async fn unlock_all(&self) -> Result<()>;

    /// On-disk sizes for planning and pre-run estimates.
    async fn table_sizes(&self) -> Result<Vec<TableSize>>;
}

/// Operations the migrator needs from the destination database.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn drop_if_exists(&self, table: &str) -> Result<()>;

    /// Create a table from a creation statement captured on the source.
    async fn create_table(&self, ddl: &str) -> Result<()>;

    /// Detach the table's storage file so a copied one can replace it.
    async fn detach_storage(&self, table: &str) -> Result<()>;

    /// Attach the copied storage file to the table definition.
    async fn attach_storage(&self, table: &str) -> Result<()>;
}
