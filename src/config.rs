//! Migrator configuration

use std::path::PathBuf;

/// Configuration for the conventional filesystem wiring, consumed by
/// [`Migrator::from_config`](crate::Migrator::from_config).
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Directory scanned for migration files.
    pub migrations_dir: PathBuf,
    /// JSON file the execution history is persisted to.
    pub state_file: PathBuf,
    /// Extension a candidate migration file must carry (without the dot).
    pub file_extension: String,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            state_file: PathBuf::from("migrations/migrations.json"),
            file_extension: "sql".to_string(),
        }
    }
}
