// ABOUTME: MySQL connection pool construction for source and destination
// ABOUTME: Handles connect options, session setup, and connection lifecycle

use crate::utils;
use anyhow::Result;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Executor;
use std::time::Duration;

/// Connect to a MySQL instance and return a pool
///
/// Every pooled session raises `wait_timeout` so connections survive the long
/// idle periods that occur while large tablespace files are copied.
pub async fn connect_pool(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
    max_connections: u32,
) -> Result<MySqlPool> {
    let options = MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .password(password)
        .database(database);

    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET SESSION wait_timeout = 999999999").await?;
                Ok(())
            })
        })
        .connect_with(options)
        .await
        .map_err(|e| {
            let error_msg = e.to_string();

            if error_msg.contains("Access denied") {
                anyhow::anyhow!(
                    "Authentication failed for {}@{}:{}.\n\
                     Please verify the admin credentials (--user / --password).",
                    user,
                    host,
                    port
                )
            } else if error_msg.contains("Unknown database") {
                anyhow::anyhow!(
                    "Database '{}' does not exist on {}:{}.",
                    database,
                    host,
                    port
                )
            } else if error_msg.contains("Connection refused") || error_msg.contains("timed out") {
                anyhow::anyhow!(
                    "Unable to reach MySQL at {}:{}.\n\
                     Please check:\n\
                     - The host and port are correct\n\
                     - The server is running\n\
                     - Firewall rules allow connections\n\
                     Error: {}",
                    host,
                    port,
                    error_msg
                )
            } else {
                anyhow::anyhow!("Failed to connect to MySQL at {}:{}: {}", host, port, error_msg)
            }
        })?;

    Ok(pool)
}

/// Connect with automatic retry for transient failures
pub async fn connect_pool_with_retry(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
    max_connections: u32,
) -> Result<MySqlPool> {
    utils::retry_with_backoff(
        || connect_pool(host, port, user, password, database, max_connections),
        3,
        Duration::from_secs(1),
    )
    .await
}
