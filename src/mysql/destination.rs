// ABOUTME: Destination-side catalog implementation over MySQL
// ABOUTME: Schema replacement and tablespace discard/import commands

use crate::catalog::DestinationCatalog;
use crate::utils::quote_identifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::Executor;

/// Destination catalog backed by a MySQL connection pool.
///
/// Imports run concurrently, so the pool should be sized to at least the
/// transfer worker count.
pub struct MysqlDestinationCatalog {
    pool: MySqlPool,
}

impl MysqlDestinationCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn execute(&self, statement: &str, context: String) -> Result<()> {
        (&self.pool)
            .execute(statement)
            .await
            .map(|_| ())
            .context(context)
    }
}

#[async_trait]
impl DestinationCatalog for MysqlDestinationCatalog {
    async fn drop_if_exists(&self, table: &str) -> Result<()> {
        let statement = format!("DROP TABLE IF EXISTS {}", quote_identifier(table));
        self.execute(&statement, format!("Failed to drop '{}'", table))
            .await
    }

    async fn create_table(&self, ddl: &str) -> Result<()> {
        self.execute(ddl, "CREATE TABLE was rejected by the destination".to_string())
            .await
    }

    async fn detach_storage(&self, table: &str) -> Result<()> {
        let statement = format!(
            "ALTER TABLE {} DISCARD TABLESPACE",
            quote_identifier(table)
        );
        self.execute(
            &statement,
            format!("DISCARD TABLESPACE failed for '{}'", table),
        )
        .await
    }

    async fn attach_storage(&self, table: &str) -> Result<()> {
        let statement = format!("ALTER TABLE {} IMPORT TABLESPACE", quote_identifier(table));
        self.execute(
            &statement,
            format!("IMPORT TABLESPACE failed for '{}'", table),
        )
        .await
    }
}
