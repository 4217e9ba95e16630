// ABOUTME: Import finalization on the destination
// ABOUTME: Re-attaches copied tablespace files, every outcome collected

use crate::catalog::DestinationCatalog;
use crate::error::MigrationError;
use crate::migration::table::TableDescriptor;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Attach the copied storage files for every successfully transferred table.
///
/// Imports are independent once the files are present, so they run
/// concurrently up to `concurrency`. Unlike the transfers, there is nothing
/// to retry here automatically: a failed import means the files are on disk
/// but the table is not queryable, and the operator re-runs the import after
/// investigating. Every dispatched import returns an outcome; none are
/// fire-and-forget.
pub async fn finalize_imports<D>(
    destination: &D,
    tables: &[Arc<TableDescriptor>],
    concurrency: usize,
) -> Vec<(Arc<TableDescriptor>, Result<(), MigrationError>)>
where
    D: DestinationCatalog + ?Sized,
{
    stream::iter(tables.iter().map(Arc::clone))
        .map(|table| async move {
            let outcome = destination
                .attach_storage(&table.name)
                .await
                .map_err(|cause| MigrationError::Import {
                    table: table.name.clone(),
                    cause,
                });
            (table, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
