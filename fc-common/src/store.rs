//! Persistence boundary for application records
//!
//! The allocator and updater only talk to storage through [`ApplicationStore`],
//! so they can be exercised against in-memory fakes in tests.

use async_trait::async_trait;

use crate::db::models::{ApplicationPatch, ApplicationRecord};
use crate::Result;

/// Result of an insert-if-absent attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new empty record now exists under the requested id
    Inserted,
    /// The id was already taken (unique constraint violation); nothing was written
    Collision,
}

/// Record table keyed by application number
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert an empty record with the given id unless one already exists
    ///
    /// Soft-deleted rows still occupy their id.
    async fn insert_empty(&self, id: u32) -> Result<InsertOutcome>;

    /// Look up a live (not soft-deleted) record
    async fn find(&self, id: u32) -> Result<Option<ApplicationRecord>>;

    /// Apply a patch only if the record exists, is live, and is still unassigned
    ///
    /// Returns `true` when exactly one row was updated. The check and the
    /// write happen in a single statement.
    async fn fill_unassigned(&self, id: u32, patch: &ApplicationPatch) -> Result<bool>;
}
