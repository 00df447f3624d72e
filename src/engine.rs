//! Migration engine
//!
//! Reconciles the persisted history against the available definitions,
//! executes the selected actions strictly in order, and advances or rewinds
//! the checkpoint history by exactly one record per run.

use std::sync::Arc;

use chrono::Utc;

use crate::config::MigratorConfig;
use crate::migration::{AppliedMigration, Direction, Migration, RunContext};
use crate::source::{DirectorySource, MigrationLoader, MigrationSource};
use crate::store::{HistoryStore, JsonHistoryStore};
use crate::{MigrateError, MigrateResult};

/// Outcome of a single `up` or `down` run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Direction the run moved in.
    pub direction: Direction,
    /// Ids whose action actually executed, in execution order.
    pub executed: Vec<i64>,
    /// Selected definitions that carried no action for this direction.
    pub skipped: usize,
    /// History frontier after the run, if any.
    pub frontier: Option<i64>,
}

impl RunReport {
    /// True when no action was executed and the history was left untouched.
    pub fn is_noop(&self) -> bool {
        self.executed.is_empty()
    }
}

/// Drives migration runs against a source of definitions and a history
/// store.
///
/// The history it maintains is a checkpoint log, not a full execution
/// ledger: a forward run appends exactly one record for the last selected
/// definition no matter how many actions it executed, and a backward run
/// pops exactly one. The two most recent records are all the engine ever
/// needs to compute the next revert window.
pub struct Migrator {
    source: Box<dyn MigrationSource>,
    store: Box<dyn HistoryStore>,
}

impl Migrator {
    /// Create a migrator from a definition source and a history store.
    pub fn new(source: impl MigrationSource + 'static, store: impl HistoryStore + 'static) -> Self {
        Self {
            source: Box::new(source),
            store: Box::new(store),
        }
    }

    /// Wire up the conventional filesystem layout: migrations discovered in
    /// `config.migrations_dir` through `loader`, history persisted to
    /// `config.state_file` as JSON.
    pub fn from_config(config: MigratorConfig, loader: impl MigrationLoader + 'static) -> Self {
        let source = DirectorySource::new(config.migrations_dir, loader)
            .with_extension(config.file_extension);
        let store = JsonHistoryStore::new(config.state_file);
        Self::new(source, store)
    }

    /// Parse `direction` and run. Anything other than `"up"` or `"down"`
    /// fails with [`MigrateError::InvalidDirection`] before any collaborator
    /// is touched.
    pub async fn run_str(&self, direction: &str) -> MigrateResult<RunReport> {
        self.run(direction.parse()?).await
    }

    /// Run a migration pass in the given direction.
    ///
    /// Loads definitions and history, executes the selected actions strictly
    /// sequentially, and persists the updated history. The first action
    /// failure propagates immediately: remaining actions do not run and the
    /// history is not modified, even though actions that already ran are not
    /// rolled back.
    ///
    /// Note: the history is persisted only when it is non-empty after the
    /// run. A store that starts non-empty and is fully reverted keeps its
    /// previously saved copy; callers who need the file cleared must do so
    /// themselves.
    pub async fn run(&self, direction: Direction) -> MigrateResult<RunReport> {
        let mut migrations = self.source.load().await?;
        migrations.sort_by_key(|m| m.id);

        let mut history = self.store.load().await;
        let report = match direction {
            Direction::Up => self.migrate_up(&mut history, &migrations).await?,
            Direction::Down => self.migrate_down(&mut history, &migrations).await?,
        };

        if !history.is_empty() {
            self.store.save(&history).await?;
        }

        Ok(report)
    }

    /// Apply every definition past the current frontier, oldest first.
    async fn migrate_up(
        &self,
        history: &mut Vec<AppliedMigration>,
        migrations: &[Migration],
    ) -> MigrateResult<RunReport> {
        let frontier = history.last().map(|record| record.id);
        let selected: Vec<&Migration> = migrations
            .iter()
            .filter(|m| frontier.map_or(true, |f| m.id > f))
            .collect();
        tracing::debug!(
            ?frontier,
            selected = selected.len(),
            "selected pending migrations"
        );

        let executed = self
            .execute(Direction::Up, &selected, history.as_slice())
            .await?;
        let skipped = selected.len() - executed.len();

        if executed.is_empty() {
            tracing::info!("no migrations to run");
        } else if let Some(last) = selected.last() {
            // One frontier record per batch, stamped with the last selected
            // definition even if that particular one had no action.
            history.push(last.to_applied(Utc::now()));
        }

        Ok(RunReport {
            direction: Direction::Up,
            executed,
            skipped,
            frontier: history.last().map(|record| record.id),
        })
    }

    /// Revert the most recent checkpoint: every definition past the
    /// runner-up, up to and including the frontier, oldest first.
    async fn migrate_down(
        &self,
        history: &mut Vec<AppliedMigration>,
        migrations: &[Migration],
    ) -> MigrateResult<RunReport> {
        let frontier = history.last().map(|record| record.id);
        let runner_up = if history.len() >= 2 {
            Some(history[history.len() - 2].id)
        } else {
            None
        };

        let selected: Vec<&Migration> = migrations
            .iter()
            .filter(|m| match (frontier, runner_up) {
                // Nothing ran yet, nothing to revert.
                (None, _) => false,
                // Exactly one checkpoint: revert everything up to it, but
                // not the definitions that were never applied.
                (Some(f), None) => m.id <= f,
                // Revert back to the previous checkpoint.
                (Some(f), Some(r)) => r < m.id && m.id <= f,
            })
            .collect();
        tracing::debug!(
            ?frontier,
            ?runner_up,
            selected = selected.len(),
            "selected revert window"
        );

        let executed = self
            .execute(Direction::Down, &selected, history.as_slice())
            .await?;
        let skipped = selected.len() - executed.len();

        if executed.is_empty() {
            tracing::info!("no migrations to run");
        } else {
            history.pop();
        }

        Ok(RunReport {
            direction: Direction::Down,
            executed,
            skipped,
            frontier: history.last().map(|record| record.id),
        })
    }

    /// Execute the actions of `selected` strictly sequentially: action k+1
    /// does not start until action k completed, since later migrations may
    /// depend on state established by earlier ones. Definitions without an
    /// action for this direction are skipped without counting as work.
    async fn execute(
        &self,
        direction: Direction,
        selected: &[&Migration],
        history: &[AppliedMigration],
    ) -> MigrateResult<Vec<i64>> {
        let ctx = RunContext {
            direction,
            applied: Arc::from(history),
        };

        let mut executed = Vec::new();
        for migration in selected {
            let Some(action) = migration.action(direction) else {
                tracing::debug!(
                    id = migration.id,
                    name = %migration.name,
                    %direction,
                    "no action for this direction, skipping"
                );
                continue;
            };

            match direction {
                Direction::Up => {
                    tracing::info!(id = migration.id, name = %migration.name, "running migration")
                }
                Direction::Down => {
                    tracing::info!(id = migration.id, name = %migration.name, "reversing migration")
                }
            }
            action(ctx.clone()).await.map_err(MigrateError::Action)?;
            executed.push(migration.id);
        }

        Ok(executed)
    }
}
