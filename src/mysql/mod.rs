// ABOUTME: MySQL utilities module
// ABOUTME: Exports connection management and the catalog implementations

pub mod connection;
pub mod destination;
pub mod source;

pub use connection::{connect_pool, connect_pool_with_retry};
pub use destination::MysqlDestinationCatalog;
pub use source::MysqlSourceCatalog;
