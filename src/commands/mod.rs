// ABOUTME: Command implementations for the CLI
// ABOUTME: Exports the migrate and plan commands

pub mod migrate;
pub mod plan;

pub use migrate::migrate;
pub use plan::plan;
