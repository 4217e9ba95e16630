// ABOUTME: Live integration tests against real MySQL instances
// ABOUTME: Gated on TEST_MYSQL_* environment variables; ignored by default

use innodb_tablespace_migrator::catalog::SourceCatalog;
use innodb_tablespace_migrator::mysql::{connect_pool, MysqlSourceCatalog};
use std::env;

/// Helper to get test connection details from the environment
fn get_test_env() -> Option<(String, String, String, String)> {
    let host = env::var("TEST_MYSQL_HOST").ok()?;
    let user = env::var("TEST_MYSQL_USER").ok()?;
    let password = env::var("TEST_MYSQL_PASSWORD").unwrap_or_default();
    let database = env::var("TEST_MYSQL_DB").ok()?;
    Some((host, user, password, database))
}

#[tokio::test]
#[ignore]
async fn test_source_catalog_against_live_instance() {
    let (host, user, password, database) =
        get_test_env().expect("TEST_MYSQL_HOST, TEST_MYSQL_USER and TEST_MYSQL_DB must be set");

    let pool = connect_pool(&host, 3306, &user, &password, &database, 2)
        .await
        .expect("connection should succeed");
    let catalog = MysqlSourceCatalog::new(pool, database);

    let tables = catalog.list_tables().await.unwrap();
    println!("Found {} table(s)", tables.len());

    for table in tables.iter().take(5) {
        let ddl = catalog.create_statement(table).await.unwrap();
        assert!(
            ddl.to_uppercase().contains("CREATE TABLE"),
            "unexpected DDL for {}: {}",
            table,
            ddl
        );
    }

    let sizes = catalog.table_sizes().await.unwrap();
    assert_eq!(sizes.len(), tables.len());
}

#[tokio::test]
#[ignore]
async fn test_export_lock_round_trip_on_live_instance() {
    let (host, user, password, database) =
        get_test_env().expect("TEST_MYSQL_HOST, TEST_MYSQL_USER and TEST_MYSQL_DB must be set");

    let pool = connect_pool(&host, 3306, &user, &password, &database, 2)
        .await
        .expect("connection should succeed");
    let catalog = MysqlSourceCatalog::new(pool, database);

    let tables = catalog.list_tables().await.unwrap();
    if tables.is_empty() {
        println!("No tables to lock; skipping");
        return;
    }

    println!("⚠ WARNING: This briefly locks {} table(s)!", tables.len());
    catalog.lock_for_export(&tables).await.unwrap();
    catalog.unlock_all().await.unwrap();

    // The lock session is gone after the release
    assert!(catalog.unlock_all().await.is_err());
}
