//! In-memory history store

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::migration::AppliedMigration;
use crate::store::HistoryStore;
use crate::MigrateResult;

/// History store backed by shared memory, for tests and embedders that do
/// not need persistence across processes.
///
/// Clones share the same underlying history, so a clone kept outside the
/// migrator can observe what the engine persisted.
#[derive(Clone, Default)]
pub struct MemoryHistoryStore {
    history: Arc<Mutex<Vec<AppliedMigration>>>,
}

impl MemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a history.
    pub fn with_history(history: Vec<AppliedMigration>) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// Copy of the currently held history.
    pub fn snapshot(&self) -> Vec<AppliedMigration> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Vec<AppliedMigration> {
        self.history.lock().clone()
    }

    async fn save(&self, history: &[AppliedMigration]) -> MigrateResult<()> {
        *self.history.lock() = history.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryHistoryStore::new();
        let observer = store.clone();

        let record = AppliedMigration {
            id: 1,
            name: "one".to_string(),
            migrated_on: Utc::now(),
        };
        store.save(&[record.clone()]).await.unwrap();

        assert_eq!(observer.load().await, vec![record]);
    }
}
