// ABOUTME: Typed error taxonomy for the migration pipeline
// ABOUTME: Distinguishes fatal run-level failures from isolated per-table ones

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline stage a failure belongs to, as surfaced in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Discover,
    Mirror,
    Lock,
    Transfer,
    Import,
    Unlock,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Discover => "discover",
            Phase::Mirror => "mirror",
            Phase::Lock => "lock",
            Phase::Transfer => "transfer",
            Phase::Import => "import",
            Phase::Unlock => "unlock",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong during a migration run.
///
/// `Discovery` and `Lock` are fatal: they abort the run before any transfer
/// starts. The schema variants (`Introspect`, `Replace`, `Create`, `Detach`)
/// and `Transfer`/`Import` are per-table and never affect other tables.
/// `Unlock` is logged and reported but never escalated — the release is
/// always attempted, and its outcome does not change the run's verdict.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("cannot enumerate source tables: {cause:#}")]
    Discovery { cause: anyhow::Error },

    #[error("cannot read definition of `{table}`: {cause:#}")]
    Introspect { table: String, cause: anyhow::Error },

    #[error("cannot replace `{table}` on destination: {cause:#}")]
    Replace { table: String, cause: anyhow::Error },

    #[error("CREATE TABLE rejected for `{table}`: {cause:#}")]
    Create { table: String, cause: anyhow::Error },

    #[error("cannot discard tablespace of `{table}`: {cause:#}")]
    Detach { table: String, cause: anyhow::Error },

    #[error("export lock failed: {cause:#}")]
    Lock { cause: anyhow::Error },

    #[error("file transfer failed for `{table}`: {cause:#}")]
    Transfer { table: String, cause: anyhow::Error },

    #[error("tablespace import failed for `{table}`: {cause:#}")]
    Import { table: String, cause: anyhow::Error },

    #[error("export lock release failed: {cause:#}")]
    Unlock { cause: anyhow::Error },
}

impl MigrationError {
    pub fn phase(&self) -> Phase {
        match self {
            MigrationError::Discovery { .. } => Phase::Discover,
            MigrationError::Introspect { .. }
            | MigrationError::Replace { .. }
            | MigrationError::Create { .. }
            | MigrationError::Detach { .. } => Phase::Mirror,
            MigrationError::Lock { .. } => Phase::Lock,
            MigrationError::Transfer { .. } => Phase::Transfer,
            MigrationError::Import { .. } => Phase::Import,
            MigrationError::Unlock { .. } => Phase::Unlock,
        }
    }

    /// Fatal errors abort the whole run; everything else is per-table.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MigrationError::Discovery { .. } | MigrationError::Lock { .. }
        )
    }

    /// The table a per-table failure belongs to, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            MigrationError::Introspect { table, .. }
            | MigrationError::Replace { table, .. }
            | MigrationError::Create { table, .. }
            | MigrationError::Detach { table, .. }
            | MigrationError::Transfer { table, .. }
            | MigrationError::Import { table, .. } => Some(table),
            _ => None,
        }
    }
}
