// ABOUTME: Export lock lifecycle for the source table set
// ABOUTME: One lock per run, released exactly once on every exit path

use crate::catalog::SourceCatalog;
use crate::error::MigrationError;

/// Lifecycle of the source-side export lock.
///
/// Transitions only `Unlocked -> Locked -> Released`, once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
    Released,
}

/// Owns the export lock for one migration run.
///
/// `lock` covers the whole batch in a single request. `unlock` is safe to
/// call on any path after that: it releases on the first call after a
/// successful lock and is a no-op otherwise, so the caller can invoke it
/// unconditionally before propagating downstream failures.
pub struct ExportCoordinator<'a, S: SourceCatalog + ?Sized> {
    catalog: &'a S,
    state: LockState,
}

impl<'a, S: SourceCatalog + ?Sized> ExportCoordinator<'a, S> {
    pub fn new(catalog: &'a S) -> Self {
        Self {
            catalog,
            state: LockState::Unlocked,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Place every table into a consistent, copy-safe state.
    ///
    /// Fatal on failure: the run must abort before any transfer starts.
    pub async fn lock(&mut self, tables: &[String]) -> Result<(), MigrationError> {
        debug_assert_eq!(self.state, LockState::Unlocked);

        self.catalog
            .lock_for_export(tables)
            .await
            .map_err(|cause| MigrationError::Lock { cause })?;

        self.state = LockState::Locked;
        tracing::info!("✓ Export lock acquired for {} table(s)", tables.len());
        Ok(())
    }

    /// Release the lock if it is held.
    ///
    /// The state moves to `Released` before the release is attempted, so the
    /// release happens at most once even if it fails and the caller runs
    /// through this path again.
    pub async fn unlock(&mut self) -> Result<(), MigrationError> {
        if self.state != LockState::Locked {
            return Ok(());
        }
        self.state = LockState::Released;

        self.catalog
            .unlock_all()
            .await
            .map_err(|cause| MigrationError::Unlock { cause })?;

        tracing::info!("✓ Export lock released");
        Ok(())
    }
}
