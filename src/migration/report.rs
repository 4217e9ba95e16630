// ABOUTME: Aggregate migration report
// ABOUTME: Per-table phase progress, abort info, and the run verdict

use crate::error::{MigrationError, Phase};
use serde::Serialize;

/// How far one table made it through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub table: String,
    pub mirrored: bool,
    pub locked: bool,
    pub transferred: bool,
    pub imported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableOutcome {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            mirrored: false,
            locked: false,
            transferred: false,
            imported: false,
            failed_phase: None,
            error: None,
        }
    }
}

/// Why a run stopped before reaching the transfer phase.
#[derive(Debug, Clone, Serialize)]
pub struct AbortInfo {
    pub phase: Phase,
    pub error: String,
}

/// End state of one migration run.
///
/// Mutated only by the orchestrator's single collecting path; workers never
/// touch it. Serializable for `--report-json`.
#[derive(Debug, Default, Serialize)]
pub struct MigrationReport {
    pub tables: Vec<TableOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<AbortInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_error: Option<String>,
}

impl MigrationReport {
    fn outcome_mut(&mut self, table: &str) -> &mut TableOutcome {
        if let Some(idx) = self.tables.iter().position(|t| t.table == table) {
            return &mut self.tables[idx];
        }
        self.tables.push(TableOutcome::new(table));
        self.tables.last_mut().unwrap()
    }

    pub fn track(&mut self, table: &str) {
        self.outcome_mut(table);
    }

    pub fn mark_mirrored(&mut self, table: &str) {
        self.outcome_mut(table).mirrored = true;
    }

    pub fn mark_locked(&mut self, table: &str) {
        self.outcome_mut(table).locked = true;
    }

    pub fn mark_transferred(&mut self, table: &str) {
        self.outcome_mut(table).transferred = true;
    }

    pub fn mark_imported(&mut self, table: &str) {
        self.outcome_mut(table).imported = true;
    }

    /// Record a per-table failure with the phase it happened in.
    pub fn record_failure(&mut self, error: &MigrationError) {
        let Some(table) = error.table() else {
            return;
        };
        let phase = error.phase();
        let message = error.to_string();
        let outcome = self.outcome_mut(table);
        outcome.failed_phase = Some(phase);
        outcome.error = Some(message);
    }

    /// Record a fatal failure that stopped the whole run.
    pub fn abort(&mut self, error: &MigrationError) {
        self.aborted = Some(AbortInfo {
            phase: error.phase(),
            error: error.to_string(),
        });
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn mirrored_count(&self) -> usize {
        self.tables.iter().filter(|t| t.mirrored).count()
    }

    pub fn locked_count(&self) -> usize {
        self.tables.iter().filter(|t| t.locked).count()
    }

    pub fn transferred_count(&self) -> usize {
        self.tables.iter().filter(|t| t.transferred).count()
    }

    pub fn imported_count(&self) -> usize {
        self.tables.iter().filter(|t| t.imported).count()
    }

    pub fn failed_tables(&self) -> Vec<&TableOutcome> {
        self.tables.iter().filter(|t| !t.imported).collect()
    }

    /// The run succeeded only if every table reached imported.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && !self.tables.is_empty() && self.tables.iter().all(|t| t.imported)
    }
}
