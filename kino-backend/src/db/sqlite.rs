//! Pooled SQLite database
//!
//! One `Database` is built at startup and shared through `AppState`. Every
//! operation checks a connection out of the r2d2 pool and returns it when the
//! guard drops, so connections are released on error paths too.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was empty
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("store task failed: {0}")]
    Task(String),
}

pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn new(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(database_url)
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let db = Self { pool };
        db.init_tables()?;
        Ok(db)
    }

    /// Check a connection out of the pool
    pub fn conn(&self) -> Result<DbConn, StoreError> {
        Ok(self.pool.get()?)
    }

    /// (open connections, idle connections)
    pub fn pool_status(&self) -> (u32, u32) {
        let state = self.pool.state();
        (state.connections, state.idle_connections)
    }

    fn init_tables(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes(user_id);",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creates_parent_dir_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("notes.db");

        let db = Database::new(db_path.to_str().unwrap(), 2).expect("Failed to open database");
        assert!(db_path.exists());

        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'notes'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_connections_return_to_pool() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pool.db");
        let db = Database::new(db_path.to_str().unwrap(), 2).unwrap();

        {
            let _a = db.conn().unwrap();
            let _b = db.conn().unwrap();
            assert_eq!(db.pool_status().1, 0);
        }

        assert_eq!(db.pool_status(), (2, 2));
    }

    #[test]
    fn test_unusable_parent_dir_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let db_path = blocker.join("nested").join("notes.db");
        let err = Database::new(db_path.to_str().unwrap(), 1).err();
        assert!(matches!(err, Some(StoreError::Io(_))));
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        drop(Database::new(path, 1).unwrap());
        assert!(Database::new(path, 1).is_ok());
    }
}
