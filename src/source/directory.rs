//! Filesystem discovery of migration definitions
//!
//! Filenames encode the ordering key: `<decimal-id>_<name>.<ext>`, split on
//! the first underscore. A file named `42.sql` is id 42 with an empty name.
//! Candidates that do not follow the pattern, or whose body fails to load,
//! are skipped silently; discovery problems are never fatal.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::migration::Migration;
use crate::source::MigrationSource;
use crate::{MigrateError, MigrateResult};

/// Turns a discovered migration file into a runnable definition.
///
/// The id and name have already been parsed from the filename; the loader is
/// responsible for attaching the actions (reading the file, resolving
/// against a registry, whatever fits the embedding). A loader error excludes
/// the file from the definition set without failing discovery.
#[async_trait]
pub trait MigrationLoader: Send + Sync {
    /// Build the migration for one discovered file.
    async fn load(&self, path: &Path, id: i64, name: &str) -> anyhow::Result<Migration>;
}

/// Discovers migrations by scanning a directory for `<id>_<name>` filenames.
///
/// A missing directory yields an empty definition set, not an error.
pub struct DirectorySource<L> {
    dir: PathBuf,
    extension: String,
    loader: L,
}

impl<L> DirectorySource<L> {
    /// Scan `dir` for files with the default `sql` extension.
    pub fn new(dir: impl Into<PathBuf>, loader: L) -> Self {
        Self {
            dir: dir.into(),
            extension: "sql".to_string(),
            loader,
        }
    }

    /// Override the extension candidate files must carry (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Parse a filename stem into `(id, name)`.
///
/// The prefix before the first underscore must parse as a decimal integer;
/// the remainder (which may itself contain underscores) is the name. Without
/// an underscore the whole stem is the id and the name is empty.
pub(crate) fn parse_stem(stem: &str) -> Option<(i64, String)> {
    match stem.split_once('_') {
        Some((prefix, rest)) => prefix.parse().ok().map(|id| (id, rest.to_string())),
        None => stem.parse().ok().map(|id| (id, String::new())),
    }
}

#[async_trait]
impl<L: MigrationLoader> MigrationSource for DirectorySource<L> {
    async fn load(&self) -> MigrateResult<Vec<Migration>> {
        if !self.dir.exists() {
            tracing::debug!(dir = %self.dir.display(), "migration directory does not exist");
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            MigrateError::Source(format!("failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut migrations = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            MigrateError::Source(format!("failed to read {}: {}", self.dir.display(), e))
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Some((id, name)) = parse_stem(stem) else {
                tracing::debug!(file = %path.display(), "filename does not start with a decimal id, skipping");
                continue;
            };

            match self.loader.load(&path, id, &name).await {
                Ok(migration) => migrations.push(migration),
                Err(err) => {
                    tracing::debug!(file = %path.display(), error = %err, "migration body failed to load, skipping");
                }
            }
        }

        Ok(migrations)
    }
}
