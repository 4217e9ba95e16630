// ABOUTME: Migration orchestrator sequencing mirror, lock, transfer, import
// ABOUTME: Guarantees the export lock is released on every post-lock path

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::MigrationError;
use crate::migration::export_lock::ExportCoordinator;
use crate::migration::report::MigrationReport;
use crate::migration::table::{TableDescriptor, TablespaceLayout};
use crate::migration::transfer::{run_transfers, TransferOptions};
use crate::migration::{import, schema};
use crate::remote::RemoteFileChannel;
use crate::utils::format_duration;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for one migration run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub workers: usize,
    pub transfer_retries: u32,
    pub retry_delay: Duration,
    pub show_progress: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            transfer_retries: 2,
            retry_delay: Duration::from_secs(1),
            show_progress: false,
        }
    }
}

/// Drives one bounded migration run to completion.
///
/// Sequencing: discover, mirror all tables, take the export lock, transfer
/// with the worker pool, import, release the lock, report. Per-table failures
/// drop that table from later stages and never block the rest; only discovery
/// and lock failures abort the run, and both happen before any file moves.
pub struct Orchestrator<S, D, C> {
    source: Arc<S>,
    destination: Arc<D>,
    channel: Arc<C>,
    layout: TablespaceLayout,
    options: MigrateOptions,
}

impl<S, D, C> Orchestrator<S, D, C>
where
    S: SourceCatalog,
    D: DestinationCatalog,
    C: RemoteFileChannel + 'static,
{
    pub fn new(
        source: Arc<S>,
        destination: Arc<D>,
        channel: Arc<C>,
        layout: TablespaceLayout,
        options: MigrateOptions,
    ) -> Self {
        Self {
            source,
            destination,
            channel,
            layout,
            options,
        }
    }

    /// Run the migration. Never panics and never returns early with the lock
    /// held; everything that happened is in the returned report.
    pub async fn run(&self) -> MigrationReport {
        let mut report = MigrationReport::default();

        // Phase 1: discover the table set
        tracing::info!("Step 1/5: Discovering source tables...");
        let tables = match self.discover().await {
            Ok(tables) => tables,
            Err(e) => {
                tracing::error!("✗ {}", e);
                report.abort(&e);
                return report;
            }
        };
        tracing::info!("Found {} table(s) to migrate", tables.len());

        // Phase 2: mirror schemas onto the destination
        tracing::info!("Step 2/5: Mirroring table definitions...");
        let survivors = self.mirror_all(&tables, &mut report).await;
        if survivors.is_empty() {
            tracing::error!("✗ No tables survived schema mirroring; nothing to transfer");
            return report;
        }

        // Phase 3: export lock over the whole surviving batch
        tracing::info!(
            "Step 3/5: Locking {} table(s) for export...",
            survivors.len()
        );
        let mut coordinator = ExportCoordinator::new(&*self.source);
        let names: Vec<String> = survivors.iter().map(|t| t.name.clone()).collect();
        if let Err(e) = coordinator.lock(&names).await {
            tracing::error!("✗ {}", e);
            report.abort(&e);
            return report;
        }
        for table in &survivors {
            report.mark_locked(&table.name);
        }

        // Phases 4-5 run with the lock held and record every failure into
        // the report instead of returning, so the unlock below is reached on
        // every path.
        self.transfer_and_import(&survivors, &mut report).await;

        if let Err(e) = coordinator.unlock().await {
            tracing::warn!("⚠ {} (release it manually with UNLOCK TABLES)", e);
            report.unlock_error = Some(e.to_string());
        }

        report
    }

    async fn discover(&self) -> Result<Vec<Arc<TableDescriptor>>, MigrationError> {
        let names = self
            .source
            .list_tables()
            .await
            .map_err(|cause| MigrationError::Discovery { cause })?;

        if names.is_empty() {
            return Err(MigrationError::Discovery {
                cause: anyhow::anyhow!("the source database has no tables"),
            });
        }

        Ok(names
            .iter()
            .map(|name| Arc::new(self.layout.descriptor(name)))
            .collect())
    }

    /// Mirror every table, returning the ones eligible for transfer.
    async fn mirror_all(
        &self,
        tables: &[Arc<TableDescriptor>],
        report: &mut MigrationReport,
    ) -> Vec<Arc<TableDescriptor>> {
        let mut survivors = Vec::with_capacity(tables.len());

        for table in tables {
            report.track(&table.name);
            match schema::mirror_table(&*self.source, &*self.destination, &table.name).await {
                Ok(()) => {
                    report.mark_mirrored(&table.name);
                    survivors.push(Arc::clone(table));
                }
                Err(e) => {
                    tracing::error!("✗ {}", e);
                    report.record_failure(&e);
                }
            }
        }

        survivors
    }

    async fn transfer_and_import(
        &self,
        tables: &[Arc<TableDescriptor>],
        report: &mut MigrationReport,
    ) {
        tracing::info!(
            "Step 4/5: Transferring {} tablespace file pair(s) with {} worker(s)...",
            tables.len(),
            self.options.workers
        );

        let progress = if self.options.show_progress {
            let bar = ProgressBar::new(tables.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("##-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let transfer_options = TransferOptions {
            workers: self.options.workers,
            retries: self.options.transfer_retries,
            retry_delay: self.options.retry_delay,
        };
        let results =
            run_transfers(Arc::clone(&self.channel), tables, &transfer_options, &progress).await;
        progress.finish_and_clear();

        let mut ready = Vec::new();
        for result in results {
            match result.error {
                None => {
                    tracing::info!(
                        "✓ `{}` transferred in {}",
                        result.table.name,
                        format_duration(result.elapsed)
                    );
                    report.mark_transferred(&result.table.name);
                    ready.push(result.table);
                }
                Some(message) => {
                    let error = MigrationError::Transfer {
                        table: result.table.name.clone(),
                        cause: anyhow::anyhow!(message),
                    };
                    tracing::error!("✗ {}", error);
                    report.record_failure(&error);
                }
            }
        }

        if ready.is_empty() {
            tracing::warn!("⚠ No tables transferred; skipping import");
            return;
        }

        tracing::info!("Step 5/5: Importing {} tablespace(s)...", ready.len());
        let outcomes =
            import::finalize_imports(&*self.destination, &ready, self.options.workers).await;
        for (table, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    tracing::info!("✓ `{}` imported", table.name);
                    report.mark_imported(&table.name);
                }
                Err(e) => {
                    tracing::error!("✗ {}", e);
                    report.record_failure(&e);
                }
            }
        }
    }
}
