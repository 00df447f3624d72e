//! History stores
//!
//! A store persists the checkpoint history between runs. The load side is
//! deliberately infallible: missing, unreadable, or corrupt state loads as
//! an empty history so a fresh target can be migrated without ceremony.

use async_trait::async_trait;

use crate::migration::AppliedMigration;
use crate::MigrateResult;

pub mod json;
pub mod memory;

pub use json::JsonHistoryStore;
pub use memory::MemoryHistoryStore;

/// Persists the execution history between runs.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the persisted history, ordered by ascending id.
    ///
    /// Read and parse problems are swallowed by contract and yield an empty
    /// history; they are never surfaced to the engine.
    async fn load(&self) -> Vec<AppliedMigration>;

    /// Persist the history. Only called with a non-empty history; the engine
    /// never asks a store to save an empty one.
    async fn save(&self, history: &[AppliedMigration]) -> MigrateResult<()>;
}
