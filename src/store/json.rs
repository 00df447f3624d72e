//! JSON file history store

use std::path::PathBuf;

use async_trait::async_trait;

use crate::migration::AppliedMigration;
use crate::store::HistoryStore;
use crate::{MigrateError, MigrateResult};

/// Persists the history as a single JSON file holding the array of applied
/// records.
///
/// Parent directories are created on save. A missing or corrupt file loads
/// as an empty history per the [`HistoryStore`] contract.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    /// Store the history at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the history is persisted to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn load(&self) -> Vec<AppliedMigration> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(
                    file = %self.path.display(),
                    error = %err,
                    "history file is not valid JSON, starting from an empty history"
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, history: &[AppliedMigration]) -> MigrateResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    MigrateError::Store(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(history)
            .map_err(|e| MigrateError::Store(e.to_string()))?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            MigrateError::Store(format!("failed to write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn applied(id: i64, name: &str) -> AppliedMigration {
        AppliedMigration {
            id,
            name: name.to_string(),
            migrated_on: Utc.with_ymd_and_hms(2023, 8, 14, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("state/migrations.json"));

        let history = vec![applied(1, "one"), applied(2, "two")];
        store.save(&history).await.unwrap();

        assert_eq!(store.load().await, history);
    }

    #[tokio::test]
    async fn persisted_file_uses_the_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migrations.json");
        let store = JsonHistoryStore::new(&path);
        assert_eq!(store.path(), path);

        store.save(&[applied(1, "one")]).await.unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"migratedOn\""));
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migrations.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = JsonHistoryStore::new(&path);
        assert!(store.load().await.is_empty());
    }
}
