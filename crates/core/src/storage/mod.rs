//! SQLite storage layer for Punchdesk

mod migrations;
mod parse;
mod sessions;
mod traits;
mod users;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::instrument;

use crate::error::Result;
use crate::models::{TimeSession, User};

pub use sessions::SessionStore;
pub use traits::{SessionRepository, Storage, UserRepository};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get session store
    pub fn sessions(&self) -> SessionStore<'_> {
        SessionStore::new(&self.conn)
    }

    /// Drop every table and recreate the schema, for development only
    ///
    /// All users and sessions are lost. The migrations journal is dropped
    /// too so the schema is rebuilt from scratch.
    #[instrument(skip(self))]
    pub fn reset_all_dangerous(&self) -> Result<()> {
        self.conn.execute_batch(
            "DROP TABLE IF EXISTS time_sessions;
             DROP TABLE IF EXISTS users;
             DROP TABLE IF EXISTS schema_migrations;",
        )?;
        self.init()
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, name: &str, id_string: &str) -> Result<User> {
        self.users().create(name, id_string)
    }

    fn find_user_by_id_string(&self, id_string: &str) -> Result<Option<User>> {
        self.users().find_by_id_string(id_string)
    }

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.users().list_all()
    }

    fn update_user(&self, user: &User) -> Result<User> {
        self.users().update(user)
    }
}

impl SessionRepository for Database {
    fn open_session(&self, user: &User, start_time: Option<DateTime<Utc>>) -> Result<TimeSession> {
        self.sessions().open(user, start_time)
    }

    fn close_session(
        &self,
        session: &TimeSession,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession> {
        self.sessions().close(session, end_time)
    }

    fn close_session_by_id(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession> {
        self.sessions().close_by_id(session_id, end_time)
    }

    fn close_all_sessions(&self, end_time: Option<DateTime<Utc>>) -> Result<usize> {
        self.sessions().close_all(end_time)
    }

    fn find_session_by_id(&self, session_id: i64) -> Result<Option<TimeSession>> {
        self.sessions().find_by_id(session_id)
    }

    fn list_active_sessions(&self) -> Result<Vec<TimeSession>> {
        self.sessions().list_active()
    }

    fn list_active_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        self.sessions().list_active_for_user(user)
    }

    fn latest_active_session_for_user(&self, user: &User) -> Result<Option<TimeSession>> {
        self.sessions().latest_active_for_user(user)
    }

    fn list_completed_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        self.sessions().list_completed_for_user(user)
    }

    fn list_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        self.sessions().list_for_user(user)
    }

    fn purge_invalid_sessions(&self) -> Result<usize> {
        self.sessions().purge_invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_on_disk_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("punchdesk.db");

        {
            let db = Database::open(&path).unwrap();
            db.users().create("Ada", "A1").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.users().find_by_id_string("A1").unwrap().is_some());
        assert!(db.schema_version() >= 1);
    }

    #[test]
    fn test_reset_all_dangerous_clears_everything() {
        let db = Database::open_in_memory().unwrap();

        let user = db.users().create("Ada", "A1").unwrap();
        db.sessions().open(&user, None).unwrap();

        db.reset_all_dangerous().unwrap();

        assert!(db.users().list_all().unwrap().is_empty());
        assert!(db.sessions().list_active().unwrap().is_empty());
        // Schema is usable again
        db.users().create("Ada", "A1").unwrap();
    }
}
