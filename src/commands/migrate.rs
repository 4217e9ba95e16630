// ABOUTME: Migrate command - runs one full tablespace migration
// ABOUTME: Wires catalogs, scp channel, and orchestrator; prints the report

use crate::catalog::{SourceCatalog, TableSize};
use crate::config::MigrationSettings;
use crate::migration::orchestrator::{MigrateOptions, Orchestrator};
use crate::migration::report::MigrationReport;
use crate::migration::table::TablespaceLayout;
use crate::mysql::{connect_pool_with_retry, MysqlDestinationCatalog, MysqlSourceCatalog};
use crate::remote::ScpChannel;
use crate::utils::{self, format_bytes};
use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Run one bounded tablespace migration and exit non-zero unless every table
/// reached imported.
///
/// Steps:
/// 1. Preflight: OpenSSH tools present, source data directory exists
/// 2. Connect to both instances and size up the batch
/// 3. Prompt for confirmation (unless `skip_confirmation`)
/// 4. Run the orchestrator and print its report
///
/// This command must run on the source host: the tablespace files are read
/// from the local filesystem and pushed to the destination over scp.
pub async fn migrate(
    settings: &MigrationSettings,
    skip_confirmation: bool,
    report_json: Option<&Path>,
) -> Result<()> {
    tracing::info!("Starting tablespace migration...");

    utils::check_required_tools()?;

    let source_dir = settings.source_data_dir();
    if !source_dir.is_dir() {
        bail!(
            "Source data directory {} does not exist.\n\
             This command must run on the source database host.",
            source_dir.display()
        );
    }

    tracing::info!("Connecting to source database...");
    let source_pool = connect_pool_with_retry(
        &settings.source_host,
        settings.source_port,
        &settings.admin_user,
        &settings.admin_password,
        &settings.source_db,
        2, // introspection plus the pinned lock session
    )
    .await
    .context("Failed to connect to source database")?;

    tracing::info!("Connecting to destination database...");
    let dest_pool = connect_pool_with_retry(
        &settings.dest_host,
        settings.dest_port,
        &settings.admin_user,
        &settings.admin_password,
        &settings.dest_db,
        settings.workers as u32 + 1,
    )
    .await
    .context("Failed to connect to destination database")?;

    let source = Arc::new(MysqlSourceCatalog::new(
        source_pool,
        settings.source_db.clone(),
    ));
    let destination = Arc::new(MysqlDestinationCatalog::new(dest_pool));

    if !skip_confirmation {
        let sizes = source.table_sizes().await?;
        if !confirm_migration(settings, &sizes)? {
            bail!("Migration cancelled by user");
        }
    }

    let channel = Arc::new(ScpChannel::new(
        settings.scp_user.clone(),
        settings.dest_host.clone(),
        settings.identity_file.clone(),
    ));
    let layout = TablespaceLayout::new(source_dir, settings.dest_data_dir());
    let options = MigrateOptions {
        workers: settings.workers,
        transfer_retries: settings.transfer_retries,
        retry_delay: settings.retry_delay,
        show_progress: true,
    };

    let orchestrator = Orchestrator::new(source, destination, channel, layout, options);
    let report = orchestrator.run().await;

    if let Some(path) = report_json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize the report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    print_report(&report);

    if let Some(abort) = &report.aborted {
        bail!("Migration aborted during {}: {}", abort.phase, abort.error);
    }
    let failed = report.failed_tables();
    if !failed.is_empty() {
        bail!(
            "{} of {} table(s) failed to migrate; see the report above",
            failed.len(),
            report.tables.len()
        );
    }

    Ok(())
}

/// Display the batch with on-disk sizes and prompt for confirmation.
fn confirm_migration(settings: &MigrationSettings, sizes: &[TableSize]) -> Result<bool> {
    let total_bytes: i64 = sizes.iter().map(|s| s.bytes).sum();

    println!();
    println!(
        "Migrating `{}` from {} to {} (destination database `{}`)",
        settings.source_db, settings.source_host, settings.dest_host, settings.dest_db
    );
    println!();
    println!("{:<32} {:<12}", "Table", "Size");
    println!("{}", "─".repeat(44));
    for size in sizes {
        println!("{:<32} {:<12}", size.name, format_bytes(size.bytes));
    }
    println!("{}", "─".repeat(44));
    println!(
        "Total: {} table(s), {}",
        sizes.len(),
        format_bytes(total_bytes)
    );
    println!();
    println!("⚠ Existing destination tables with the same names will be replaced.");
    print!("Proceed with migration? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;

    Ok(input.trim().to_lowercase() == "y")
}

/// Print per-table results and the final summary line.
fn print_report(report: &MigrationReport) {
    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Migration Summary");
    tracing::info!("========================================");

    for outcome in &report.tables {
        if outcome.imported {
            tracing::info!("  ✓ {}: imported", outcome.table);
        } else {
            let phase = outcome
                .failed_phase
                .map(|p| p.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let detail = outcome.error.as_deref().unwrap_or("no detail");
            if outcome.transferred {
                // Files are on the destination; only the import needs a retry
                tracing::error!(
                    "  ✗ {}: transferred but not imported ({}): {}",
                    outcome.table,
                    phase,
                    detail
                );
            } else {
                tracing::error!("  ✗ {}: failed at {}: {}", outcome.table, phase, detail);
            }
        }
    }

    if let Some(abort) = &report.aborted {
        tracing::error!("Run aborted during {}: {}", abort.phase, abort.error);
    }
    if let Some(unlock_error) = &report.unlock_error {
        tracing::warn!("⚠ Export lock release failed: {}", unlock_error);
    }

    tracing::info!("Mirrored: {}", report.mirrored_count());
    tracing::info!("Locked: {}", report.locked_count());
    tracing::info!("Transferred: {}", report.transferred_count());
    tracing::info!("Imported: {}", report.imported_count());
    tracing::info!("========================================");

    println!("{} tables copied", report.imported_count());
}
