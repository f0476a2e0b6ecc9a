//! SQLite-backed persistence for users, projects, sprints and work items
//!
//! Every core operation runs inside one transaction:
//! - reads use a deferred transaction, so they see one consistent snapshot
//! - mutations use `BEGIN IMMEDIATE` so concurrent writers serialize on the
//!   database write lock before they read anything they depend on
//! - a busy timeout makes a second writer wait instead of failing
//! - returning an error from the closure rolls the transaction back

mod queries;
mod schema;

pub use queries::Repo;

use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};

use crate::core::error::TrackerResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Default time a writer waits for the database lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The tracker database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database file
    pub fn open(path: &Path, busy_timeout: Duration) -> TrackerResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        // WAL lets readers proceed while a writer holds the lock
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self { conn };
        store.configure()?;
        Ok(store)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> TrackerResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.configure()?;
        Ok(store)
    }

    fn configure(&self) -> TrackerResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        if self.schema_version()? != Some(SCHEMA_VERSION) {
            self.init_schema()?;
        }
        Ok(())
    }

    /// Run `f` inside an immediate (write-locked) transaction
    pub(crate) fn write<T, F>(&mut self, f: F) -> TrackerResult<T>
    where
        F: FnOnce(&Repo<'_>) -> TrackerResult<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&Repo::new(&tx))?;
        tx.commit()?;
        Ok(out)
    }

    /// Run `f` inside a deferred transaction
    ///
    /// Every statement in `f` sees the same snapshot, so an access check and
    /// the rows read after it agree. No write lock is taken.
    pub(crate) fn read<T, F>(&self, f: F) -> TrackerResult<T>
    where
        F: FnOnce(&Repo<'_>) -> TrackerResult<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(&Repo::new(&tx))?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TrackerError;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_schema() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/sprinter.db");

        let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        assert!(path.exists());
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sprinter.db");

        {
            let mut store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
            store
                .write(|repo| repo.insert_user("alice", "Alice", Default::default()))
                .unwrap();
        }

        let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let count = store.read(|repo| repo.count_users()).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();

        let result: TrackerResult<()> = store.write(|repo| {
            repo.insert_user("bob", "Bob", Default::default())?;
            Err(TrackerError::validation("abort"))
        });
        assert!(result.is_err());

        let count = store.read(|repo| repo.count_users()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_read_sees_one_snapshot() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sprinter.db");
        let reader = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let mut writer = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        writer
            .write(|repo| repo.insert_user("alice", "Alice", Default::default()))
            .unwrap();

        let (before, after) = reader
            .read(|repo| {
                let before = repo.count_users()?;
                // A commit from another connection lands mid-read
                writer.write(|w| w.insert_user("bob", "Bob", Default::default()))?;
                let after = repo.count_users()?;
                Ok((before, after))
            })
            .unwrap();
        assert_eq!(before, 1);
        assert_eq!(after, 1);

        // The next read observes the new row
        assert_eq!(reader.read(|repo| repo.count_users()).unwrap(), 2);
    }
}
