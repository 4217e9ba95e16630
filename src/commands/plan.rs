// ABOUTME: Plan command - read-only migration dry run
// ABOUTME: Lists tables, sizes, file paths, and a transfer time estimate

use crate::catalog::SourceCatalog;
use crate::config::MigrationSettings;
use crate::mysql::{connect_pool_with_retry, MysqlSourceCatalog};
use crate::utils::{format_bytes, format_duration};
use anyhow::{Context, Result};
use std::time::Duration;

// Conservative end-to-end throughput for scp plus import, used only for the
// operator-facing estimate.
const ESTIMATED_BYTES_PER_HOUR: i64 = 60 * 1024 * 1024 * 1024;

/// Show what a migration run would do, without touching either instance.
pub async fn plan(settings: &MigrationSettings) -> Result<()> {
    tracing::info!("Planning migration of '{}'...", settings.source_db);

    let pool = connect_pool_with_retry(
        &settings.source_host,
        settings.source_port,
        &settings.admin_user,
        &settings.admin_password,
        &settings.source_db,
        2,
    )
    .await
    .context("Failed to connect to source database")?;
    let catalog = MysqlSourceCatalog::new(pool, settings.source_db.clone());

    let sizes = catalog.table_sizes().await?;
    if sizes.is_empty() {
        tracing::warn!("⚠ No tables found in '{}'", settings.source_db);
        return Ok(());
    }

    let total_bytes: i64 = sizes.iter().map(|s| s.bytes).sum();

    println!();
    println!("{:<32} {:<12} {:<12}", "Table", "Size", "Est. Time");
    println!("{}", "─".repeat(58));
    for size in &sizes {
        println!(
            "{:<32} {:<12} {:<12}",
            size.name,
            format_bytes(size.bytes),
            format_duration(estimate_transfer_duration(size.bytes))
        );
    }
    println!("{}", "─".repeat(58));
    println!(
        "Total: {} table(s), {} (estimated {})",
        sizes.len(),
        format_bytes(total_bytes),
        format_duration(estimate_transfer_duration(total_bytes))
    );
    println!();
    println!(
        "Files copy from {} to {}:{} as {} pair(s) of .cfg/.ibd files,",
        settings.source_data_dir().display(),
        settings.dest_host,
        settings.dest_data_dir().display(),
        sizes.len()
    );
    println!(
        "using {} worker(s) over scp as {}@{}.",
        settings.workers, settings.scp_user, settings.dest_host
    );
    println!("The source holds an export lock for the duration of the transfer.");

    Ok(())
}

fn estimate_transfer_duration(bytes: i64) -> Duration {
    let seconds = (bytes.max(0) as f64 / ESTIMATED_BYTES_PER_HOUR as f64) * 3600.0;
    Duration::from_secs(seconds.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_scales_with_size() {
        assert_eq!(
            estimate_transfer_duration(ESTIMATED_BYTES_PER_HOUR),
            Duration::from_secs(3600)
        );
        assert_eq!(
            estimate_transfer_duration(ESTIMATED_BYTES_PER_HOUR / 2),
            Duration::from_secs(1800)
        );
        assert_eq!(estimate_transfer_duration(0), Duration::from_secs(0));
    }
}
