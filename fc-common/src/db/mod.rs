//! Database access: schema setup, migrations and the SQLite application store

pub mod applications;
pub mod init;
pub mod migrations;
pub mod models;

pub use applications::SqliteApplicationStore;
pub use init::*;
pub use models::*;
