// ABOUTME: Core data model for the migration pipeline
// ABOUTME: Table descriptors, queued jobs, and per-job transfer results

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where tablespace files live on each host.
#[derive(Debug, Clone)]
pub struct TablespaceLayout {
    source_dir: PathBuf,
    dest_dir: PathBuf,
}

impl TablespaceLayout {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Build the immutable descriptor for one table.
    ///
    /// Each InnoDB table ships as a pair: the `.cfg` metadata file written by
    /// the export lock, and the `.ibd` data file.
    pub fn descriptor(&self, name: &str) -> TableDescriptor {
        TableDescriptor {
            source_cfg: self.source_dir.join(format!("{}.cfg", name)),
            source_ibd: self.source_dir.join(format!("{}.ibd", name)),
            dest_cfg: self.dest_dir.join(format!("{}.cfg", name)),
            dest_ibd: self.dest_dir.join(format!("{}.ibd", name)),
            name: name.to_string(),
        }
    }
}

/// One table being migrated. Immutable after discovery; shared read-only
/// with the transfer workers.
#[derive(Debug)]
pub struct TableDescriptor {
    pub name: String,
    pub source_cfg: PathBuf,
    pub source_ibd: PathBuf,
    pub dest_cfg: PathBuf,
    pub dest_ibd: PathBuf,
}

impl TableDescriptor {
    /// The file pair in copy order: metadata first, then data.
    pub fn file_pairs(&self) -> [(&Path, &Path); 2] {
        [
            (self.source_cfg.as_path(), self.dest_cfg.as_path()),
            (self.source_ibd.as_path(), self.dest_ibd.as_path()),
        ]
    }
}

/// The unit placed on the transfer queue. Consumed exactly once by exactly
/// one worker; a retry is a fresh job with a bumped attempt counter.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    pub table: Arc<TableDescriptor>,
    pub attempt: u32,
}

impl MigrationJob {
    pub fn new(table: Arc<TableDescriptor>) -> Self {
        Self { table, attempt: 0 }
    }

    pub fn retry(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            attempt: self.attempt + 1,
        }
    }
}

/// Outcome of one worker's attempt at one job. Exactly one of these is
/// produced per dispatched job, success or failure.
#[derive(Debug)]
pub struct TransferResult {
    pub table: Arc<TableDescriptor>,
    pub attempt: u32,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl TransferResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builds_file_pair_paths() {
        let layout = TablespaceLayout::new("/var/lib/mysql/shop", "/data/mysql/shop");
        let table = layout.descriptor("orders");

        assert_eq!(table.name, "orders");
        assert_eq!(
            table.source_cfg,
            PathBuf::from("/var/lib/mysql/shop/orders.cfg")
        );
        assert_eq!(
            table.source_ibd,
            PathBuf::from("/var/lib/mysql/shop/orders.ibd")
        );
        assert_eq!(table.dest_cfg, PathBuf::from("/data/mysql/shop/orders.cfg"));
        assert_eq!(table.dest_ibd, PathBuf::from("/data/mysql/shop/orders.ibd"));
    }

    #[test]
    fn test_file_pairs_copy_metadata_first() {
        let layout = TablespaceLayout::new("/src", "/dst");
        let table = layout.descriptor("t");
        let pairs = table.file_pairs();

        assert_eq!(pairs[0].0, Path::new("/src/t.cfg"));
        assert_eq!(pairs[1].0, Path::new("/src/t.ibd"));
    }

    #[test]
    fn test_retry_bumps_attempt_and_keeps_table() {
        let layout = TablespaceLayout::new("/src", "/dst");
        let job = MigrationJob::new(Arc::new(layout.descriptor("t")));
        let retry = job.retry();

        assert_eq!(retry.attempt, 1);
        assert_eq!(retry.table.name, "t");
    }
}
