// ABOUTME: Migration pipeline module
// ABOUTME: Schema mirroring, export lock, transfer pool, import, orchestration

pub mod export_lock;
pub mod import;
pub mod orchestrator;
pub mod report;
pub mod schema;
pub mod table;
pub mod transfer;

pub use export_lock::{ExportCoordinator, LockState};
pub use import::finalize_imports;
pub use orchestrator::{MigrateOptions, Orchestrator};
pub use report::{MigrationReport, TableOutcome};
pub use schema::mirror_table;
pub use table::{MigrationJob, TableDescriptor, TablespaceLayout, TransferResult};
pub use transfer::{run_transfers, TransferOptions};
