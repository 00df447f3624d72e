//! End-to-end coverage of the conventional filesystem wiring: migrations
//! discovered from a directory, history persisted as a JSON file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use waymark::{
    Direction, MigrateError, Migration, MigrationLoader, Migrator, MigratorConfig, RunContext,
};

type ActionLog = Arc<Mutex<Vec<String>>>;

/// Loader that attaches actions appending `"<direction> <id>"` to a shared
/// log, standing in for real side effects against an external target.
struct LoggingLoader {
    log: ActionLog,
}

#[async_trait]
impl MigrationLoader for LoggingLoader {
    async fn load(&self, _path: &Path, id: i64, name: &str) -> anyhow::Result<Migration> {
        let up_log = self.log.clone();
        let down_log = self.log.clone();
        Ok(Migration::new(id, name)
            .up(move |ctx: RunContext| {
                let log = up_log.clone();
                async move {
                    log.lock().push(format!("{} {}", ctx.direction, id));
                    Ok(())
                }
            })
            .down(move |ctx: RunContext| {
                let log = down_log.clone();
                async move {
                    log.lock().push(format!("{} {}", ctx.direction, id));
                    Ok(())
                }
            }))
    }
}

fn setup(dir: &TempDir, filenames: &[&str]) -> (Migrator, ActionLog, std::path::PathBuf) {
    let migrations_dir = dir.path().join("migrations");
    fs::create_dir_all(&migrations_dir).unwrap();
    for filename in filenames {
        fs::write(migrations_dir.join(filename), "").unwrap();
    }

    let state_file = migrations_dir.join("migrations.json");
    let config = MigratorConfig {
        migrations_dir,
        state_file: state_file.clone(),
        file_extension: "sql".to_string(),
    };

    let log: ActionLog = Default::default();
    let migrator = Migrator::from_config(config, LoggingLoader { log: log.clone() });
    (migrator, log, state_file)
}

#[tokio::test]
async fn up_discovers_runs_and_persists() {
    let dir = TempDir::new().unwrap();
    let (migrator, log, state_file) = setup(
        &dir,
        &["2_add_email.sql", "1_create_users.sql", "notes.sql"],
    );

    let report = migrator.run_str("up").await.unwrap();

    assert_eq!(report.executed, vec![1, 2]);
    assert_eq!(*log.lock(), vec!["up 1", "up 2"]);

    // One collapsed record for the whole batch, in the wire format.
    let raw = fs::read_to_string(&state_file).unwrap();
    let state: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = state.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 2);
    assert_eq!(records[0]["name"], "add_email");
    assert!(records[0]["migratedOn"].is_string());
}

#[tokio::test]
async fn down_rewinds_the_last_checkpoint() {
    let dir = TempDir::new().unwrap();
    let (migrator, log, state_file) = setup(&dir, &["1_one.sql", "2_two.sql", "3_three.sql"]);

    migrator.run(Direction::Up).await.unwrap();
    log.lock().clear();

    let report = migrator.run(Direction::Down).await.unwrap();

    // Single checkpoint covered everything, so the whole batch reverts.
    assert_eq!(report.executed, vec![1, 2, 3]);
    assert_eq!(report.frontier, None);
    assert_eq!(*log.lock(), vec!["down 1", "down 2", "down 3"]);

    // The emptied history is deliberately not persisted; the file keeps the
    // pre-revert checkpoint.
    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&state_file).unwrap()).unwrap();
    assert_eq!(state.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_up_runs_advance_one_checkpoint_at_a_time() {
    let dir = TempDir::new().unwrap();
    let (migrator, log, _state_file) = setup(&dir, &["1_one.sql"]);

    migrator.run(Direction::Up).await.unwrap();

    // A new migration lands later.
    fs::write(dir.path().join("migrations/5_five.sql"), "").unwrap();
    let report = migrator.run(Direction::Up).await.unwrap();
    assert_eq!(report.executed, vec![5]);
    assert_eq!(report.frontier, Some(5));

    // Reverting peels checkpoints back one at a time.
    let report = migrator.run(Direction::Down).await.unwrap();
    assert_eq!(report.executed, vec![5]);
    assert_eq!(report.frontier, Some(1));

    let report = migrator.run(Direction::Down).await.unwrap();
    assert_eq!(report.executed, vec![1]);
    assert_eq!(report.frontier, None);

    assert_eq!(*log.lock(), vec!["up 1", "up 5", "down 5", "down 1"]);
}

#[tokio::test]
async fn corrupt_state_file_restarts_from_scratch() {
    let dir = TempDir::new().unwrap();
    let (migrator, log, state_file) = setup(&dir, &["1_one.sql"]);
    fs::write(&state_file, "definitely not json").unwrap();

    let report = migrator.run(Direction::Up).await.unwrap();

    assert_eq!(report.executed, vec![1]);
    assert_eq!(*log.lock(), vec!["up 1"]);
}

#[tokio::test]
async fn bad_direction_string_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let (migrator, log, state_file) = setup(&dir, &["1_one.sql"]);

    let err = migrator.run_str("UP").await.unwrap_err();

    assert!(matches!(err, MigrateError::InvalidDirection(_)));
    assert!(log.lock().is_empty());
    assert!(!state_file.exists());
}
