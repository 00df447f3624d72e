//! Core migration types
//!
//! Defines the migration unit itself, the applied-migration record the
//! history is made of, and the context handed to every action.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::MigrateError;

/// Direction a run moves the migration history in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply pending migrations.
    Up,
    /// Revert the most recent checkpoint.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(MigrateError::InvalidDirection(other.to_string())),
        }
    }
}

/// Context handed to every migration action.
///
/// `applied` is a snapshot of the history taken at the start of the run,
/// before the run mutates it; cloning is cheap.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Direction of the run this action is part of.
    pub direction: Direction,
    /// History as it stood when the run began.
    pub applied: Arc<[AppliedMigration]>,
}

/// An opaque migration step: takes the run context, completes or fails
/// asynchronously. Stored behind an `Arc` so migrations stay cloneable.
pub type Action = Arc<dyn Fn(RunContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A single reversible unit of change.
///
/// The `id` is strictly the ordering key (conventionally a unix timestamp)
/// and must be unique across the definition set; the engine does not enforce
/// uniqueness and behavior with duplicate ids is undefined. Either action
/// may be absent, which means "no-op in that direction."
#[derive(Clone)]
pub struct Migration {
    /// Sortable ordering key.
    pub id: i64,
    /// Human-readable label, no uniqueness constraint.
    pub name: String,
    pub(crate) up: Option<Action>,
    pub(crate) down: Option<Action>,
}

impl Migration {
    /// Create a migration with no actions attached.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            up: None,
            down: None,
        }
    }

    /// Attach the forward action.
    pub fn up<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(RunContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.up = Some(Arc::new(move |ctx| Box::pin(action(ctx))));
        self
    }

    /// Attach the backward action.
    pub fn down<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(RunContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.down = Some(Arc::new(move |ctx| Box::pin(action(ctx))));
        self
    }

    /// Whether a forward action is attached.
    pub fn has_up(&self) -> bool {
        self.up.is_some()
    }

    /// Whether a backward action is attached.
    pub fn has_down(&self) -> bool {
        self.down.is_some()
    }

    pub(crate) fn action(&self, direction: Direction) -> Option<&Action> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }

    /// Convert into the record stored in the history once this migration
    /// becomes the frontier.
    pub fn to_applied(&self, migrated_on: DateTime<Utc>) -> AppliedMigration {
        AppliedMigration {
            id: self.id,
            name: self.name.clone(),
            migrated_on,
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("up", &self.up.is_some())
            .field("down", &self.down.is_some())
            .finish()
    }
}

/// Record that a migration frontier was reached.
///
/// Serializes to the `{"id": .., "name": .., "migratedOn": ..}` shape used
/// by the persisted history format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMigration {
    /// Id of the migration that was applied.
    pub id: i64,
    /// Name at time of application (denormalized copy).
    pub name: String,
    /// When the migration was applied.
    pub migrated_on: DateTime<Utc>,
}
