// ABOUTME: Schema mirroring from source to destination
// ABOUTME: Replaces each destination table and detaches its storage file

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::MigrationError;

/// Mirror one table's definition onto the destination.
///
/// Reads the authoritative creation statement from the source, destructively
/// replaces any same-named destination table, recreates it, and detaches its
/// storage file so the destination expects an externally supplied one.
///
/// Replacement is drop-then-create, so mirroring the same table twice leaves
/// the destination in the same state. The detach must succeed before any
/// transfer starts for this table; a table whose storage was never discarded
/// cannot import the copied file later.
pub async fn mirror_table<S, D>(
    source: &S,
    destination: &D,
    table: &str,
) -> Result<(), MigrationError>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let ddl = source
        .create_statement(table)
        .await
        .map_err(|cause| MigrationError::Introspect {
            table: table.to_string(),
            cause,
        })?;

    destination
        .drop_if_exists(table)
        .await
        .map_err(|cause| MigrationError::Replace {
            table: table.to_string(),
            cause,
        })?;

    destination
        .create_table(&ddl)
        .await
        .map_err(|cause| MigrationError::Create {
            table: table.to_string(),
            cause,
        })?;

    destination
        .detach_storage(table)
        .await
        .map_err(|cause| MigrationError::Detach {
            table: table.to_string(),
            cause,
        })?;

    tracing::debug!("Mirrored `{}` (created and detached on destination)", table);
    Ok(())
}
