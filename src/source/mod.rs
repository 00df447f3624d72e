//! Migration sources
//!
//! A source produces the set of available migration definitions. The order
//! of the returned vector is not trusted; the engine re-sorts by id before
//! every run.

use async_trait::async_trait;

use crate::migration::Migration;
use crate::MigrateResult;

pub mod directory;
pub mod registry;

pub use directory::{DirectorySource, MigrationLoader};
pub use registry::StaticSource;

/// Produces the available migration definitions.
#[async_trait]
pub trait MigrationSource: Send + Sync {
    /// Enumerate every available migration definition, in no particular
    /// order.
    async fn load(&self) -> MigrateResult<Vec<Migration>>;
}
