// ABOUTME: Source-side catalog implementation over MySQL
// ABOUTME: Table discovery, DDL introspection, and the export lock session

use crate::catalog::{SourceCatalog, TableSize};
use crate::utils::quote_identifier;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlPool};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, Row};
use tokio::sync::Mutex;

/// Source catalog backed by a MySQL connection pool.
///
/// `FLUSH TABLES ... FOR EXPORT` only stays in effect while the issuing
/// session is open, and `UNLOCK TABLES` must run on that same session, so the
/// lock pins one pool connection for its whole lifetime.
pub struct MysqlSourceCatalog {
    pool: MySqlPool,
    database: String,
    lock_session: Mutex<Option<PoolConnection<MySql>>>,
}

impl MysqlSourceCatalog {
    pub fn new(pool: MySqlPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
            lock_session: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SourceCatalog for MysqlSourceCatalog {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list source tables")?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(Into::into))
            .collect()
    }

    async fn create_statement(&self, table: &str) -> Result<String> {
        let query = format!("SHOW CREATE TABLE {}", quote_identifier(table));
        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("SHOW CREATE TABLE failed for '{}'", table))?;

        // Column 0 is the table name, column 1 the creation statement
        row.try_get::<String, _>(1)
            .context("Unexpected SHOW CREATE TABLE result shape")
    }

    async fn lock_for_export(&self, tables: &[String]) -> Result<()> {
        if tables.is_empty() {
            bail!("Refusing to lock an empty table set");
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire a session for the export lock")?;

        let list = tables
            .iter()
            .map(|t| quote_identifier(t))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!("FLUSH TABLES {} FOR EXPORT", list);

        (&mut *conn)
            .execute(statement.as_str())
            .await
            .with_context(|| format!("FLUSH TABLES FOR EXPORT failed for {} table(s)", tables.len()))?;

        *self.lock_session.lock().await = Some(conn);
        Ok(())
    }

    async fn unlock_all(&self) -> Result<()> {
        let Some(mut conn) = self.lock_session.lock().await.take() else {
            bail!("No export lock session is active");
        };

        (&mut *conn)
            .execute("UNLOCK TABLES")
            .await
            .context("UNLOCK TABLES failed")?;

        // Dropping the connection returns it to the pool
        Ok(())
    }

    async fn table_sizes(&self) -> Result<Vec<TableSize>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT table_name,
                    CAST(COALESCE(data_length, 0) + COALESCE(index_length, 0) AS SIGNED)
             FROM information_schema.tables
             WHERE table_schema = ?
             ORDER BY table_name",
        )
        .bind(&self.database)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query table sizes")?;

        Ok(rows
            .into_iter()
            .map(|(name, bytes)| TableSize { name, bytes })
            .collect())
    }
}
