//! Static registration table of migrations

use async_trait::async_trait;

use crate::migration::Migration;
use crate::source::MigrationSource;
use crate::MigrateResult;

/// In-memory registration table of migrations.
///
/// The Rust-native replacement for loading migration bodies from script
/// files: migrations are registered in code, typically at startup, and the
/// source hands out clones on every load.
#[derive(Default)]
pub struct StaticSource {
    migrations: Vec<Migration>,
}

impl StaticSource {
    /// Create an empty registration table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration. Registration order is irrelevant; the engine
    /// sorts by id.
    pub fn register(mut self, migration: Migration) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Number of registered migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[async_trait]
impl MigrationSource for StaticSource {
    async fn load(&self) -> MigrateResult<Vec<Migration>> {
        Ok(self.migrations.clone())
    }
}
