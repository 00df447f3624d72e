//! # waymark
//!
//! A checkpoint-based, async migration runner.
//!
//! ## Features
//!
//! - **Ordered, reversible migrations**: every migration carries an integer
//!   ordering key and optional async `up`/`down` actions
//! - **Checkpoint history**: each run advances or rewinds a single frontier
//!   record instead of ledgering every migration individually
//! - **Pluggable sources**: static registration tables or filesystem
//!   discovery with `<id>_<name>` filenames
//! - **Pluggable history stores**: JSON file, in-memory, or your own
//! - **Runtime-agnostic**: actions are plain boxed futures, no executor
//!   dependency in the library
//!
//! ## Quick Start
//!
//! ```rust
//! use waymark::{Direction, Migration, Migrator, MemoryHistoryStore, StaticSource};
//!
//! # tokio_test::block_on(async {
//! let source = StaticSource::new()
//!     .register(
//!         Migration::new(1, "create users table")
//!             .up(|_ctx| async { Ok(()) })
//!             .down(|_ctx| async { Ok(()) }),
//!     )
//!     .register(
//!         Migration::new(2, "add email column")
//!             .up(|_ctx| async { Ok(()) }),
//!     );
//!
//! let migrator = Migrator::new(source, MemoryHistoryStore::new());
//!
//! let report = migrator.run(Direction::Up).await.unwrap();
//! assert_eq!(report.executed, vec![1, 2]);
//! assert_eq!(report.frontier, Some(2));
//!
//! // A second run has nothing left to do.
//! let report = migrator.run(Direction::Up).await.unwrap();
//! assert!(report.is_noop());
//! # });
//! ```

use thiserror::Error;

pub mod config;
pub mod engine;
pub mod migration;
pub mod source;
pub mod store;

pub use config::*;
pub use engine::*;
pub use migration::*;
pub use source::*;
pub use store::*;

/// Migration run errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The direction argument was neither `"up"` nor `"down"`. Raised before
    /// any collaborator is touched.
    #[error("migration direction must be \"up\" or \"down\", got `{0}`")]
    InvalidDirection(String),

    /// A migration action failed. The underlying error is passed through
    /// verbatim; the engine neither wraps nor retries it.
    #[error(transparent)]
    Action(#[from] anyhow::Error),

    /// The migration source could not enumerate its definitions.
    #[error("failed to load migrations: {0}")]
    Source(String),

    /// The history store could not persist the post-run history.
    #[error("failed to persist migration history: {0}")]
    Store(String),
}

/// Result type for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;
