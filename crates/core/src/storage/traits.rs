//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{TimeSession, User};

/// User registry operations
pub trait UserRepository {
    /// Create a new user; Conflict if the id_string is taken
    fn create_user(&self, name: &str, id_string: &str) -> Result<User>;

    /// Find a user by external ID string
    fn find_user_by_id_string(&self, id_string: &str) -> Result<Option<User>>;

    /// Find a user by store key
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// List all users
    fn list_users(&self) -> Result<Vec<User>>;

    /// Update a persisted user; Conflict if the new id_string collides
    fn update_user(&self, user: &User) -> Result<User>;
}

/// Session ledger operations
pub trait SessionRepository {
    /// Open a new active session for a user
    fn open_session(&self, user: &User, start_time: Option<DateTime<Utc>>) -> Result<TimeSession>;

    /// Close a session; Rejected if the ordering invariant would break
    fn close_session(
        &self,
        session: &TimeSession,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession>;

    /// Close a session by id; NotFound if missing, Rejected if closed
    fn close_session_by_id(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession>;

    /// Bulk-close every startable active session
    fn close_all_sessions(&self, end_time: Option<DateTime<Utc>>) -> Result<usize>;

    /// Find a session by store key
    fn find_session_by_id(&self, session_id: i64) -> Result<Option<TimeSession>>;

    /// List all active sessions
    fn list_active_sessions(&self) -> Result<Vec<TimeSession>>;

    /// List a user's active sessions, newest first
    fn list_active_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>>;

    /// Most recently started active session for a user
    fn latest_active_session_for_user(&self, user: &User) -> Result<Option<TimeSession>>;

    /// List a user's completed sessions
    fn list_completed_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>>;

    /// List every session for a user
    fn list_sessions_for_user(&self, user: &User) -> Result<Vec<TimeSession>>;

    /// Delete malformed session rows
    fn purge_invalid_sessions(&self) -> Result<usize>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage: UserRepository + SessionRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: UserRepository + SessionRepository {}
