//! Session ledger storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{instrument, warn};

use super::parse::{parse_datetime_opt, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{TimeSession, User};

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Open a new active session for a user
    ///
    /// Defaults the start time to now. Does not check whether the user
    /// already has an active session; that policy belongs to the toggle.
    #[instrument(skip(self, user), fields(id_string = %user.id_string))]
    pub fn open(&self, user: &User, start_time: Option<DateTime<Utc>>) -> Result<TimeSession> {
        let user_id = user.id.ok_or_else(|| {
            Error::Rejected("cannot open a session for an unpersisted user".to_string())
        })?;
        let start = start_time.unwrap_or_else(Utc::now);

        self.conn.execute(
            "INSERT INTO time_sessions (user_id, start_time, end_time) VALUES (?1, ?2, NULL)",
            params![user_id, start.to_rfc3339()],
        )?;

        let mut session = TimeSession::new(user_id, start);
        session.id = Some(self.conn.last_insert_rowid());
        crate::invariants::assert_session_invariants(&session);
        Ok(session)
    }

    /// Close a session at the given end time
    ///
    /// Defaults the end time to now. The in-memory session is a transient
    /// view, so the row is re-read before mutating. Rejected if the session
    /// has no store key, was never started, is already closed, or the end
    /// time is not strictly after the start time.
    #[instrument(skip(self, session), fields(session_id = ?session.id))]
    pub fn close(
        &self,
        session: &TimeSession,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession> {
        let id = session
            .id
            .ok_or_else(|| Error::Rejected("session has no store key".to_string()))?;
        let current = self
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("no session with id {id}")))?;

        if !current.is_active() {
            warn!(session_id = id, "Tried to close an already closed session");
            return Err(Error::Rejected(format!("session {id} is already closed")));
        }

        self.close_row(current, end_time)
    }

    /// Close the session with the given id
    ///
    /// NotFound if no such session exists; Rejected if it is already closed.
    #[instrument(skip(self))]
    pub fn close_by_id(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession> {
        let session = self.find_by_id(session_id)?.ok_or_else(|| {
            warn!(session_id, "Tried to close a nonexistent session");
            Error::NotFound(format!("no session with id {session_id}"))
        })?;

        if session.is_completed() {
            warn!(session_id, "Tried to close an already closed session");
            return Err(Error::Rejected(format!(
                "session {session_id} is already closed"
            )));
        }

        self.close_row(session, end_time)
    }

    /// Apply the end time to an open row and persist it
    fn close_row(
        &self,
        mut session: TimeSession,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<TimeSession> {
        let end = end_time.unwrap_or_else(Utc::now);

        if session.start_time.is_none() {
            return Err(Error::Rejected(
                "cannot close a session that was never started".to_string(),
            ));
        }
        if !session.finish_at(end) {
            return Err(Error::Rejected(
                "end time must be strictly after start time".to_string(),
            ));
        }

        crate::invariants::assert_session_invariants(&session);
        self.persist(&session)?;
        Ok(session)
    }

    /// Write a session's fields back to its row
    fn persist(&self, session: &TimeSession) -> Result<()> {
        let id = session
            .id
            .ok_or_else(|| Error::Rejected("session has no store key".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE time_sessions SET user_id = ?1, start_time = ?2, end_time = ?3 WHERE id = ?4",
            params![
                session.user_id,
                session.start_time.map(|t| t.to_rfc3339()),
                session.end_time.map(|t| t.to_rfc3339()),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("no session with id {id}")));
        }
        Ok(())
    }

    /// Close every active session that was started before the end time
    ///
    /// One bulk operation; rows with an absent start time are left
    /// untouched. Returns the number of sessions closed.
    #[instrument(skip(self))]
    pub fn close_all(&self, end_time: Option<DateTime<Utc>>) -> Result<usize> {
        let end = end_time.unwrap_or_else(Utc::now).to_rfc3339();

        let closed = self.conn.execute(
            "UPDATE time_sessions SET end_time = ?1
             WHERE end_time IS NULL AND start_time IS NOT NULL AND start_time < ?1",
            params![end],
        )?;

        Ok(closed)
    }

    /// Find a session by its store key
    #[instrument(skip(self))]
    pub fn find_by_id(&self, session_id: i64) -> Result<Option<TimeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time FROM time_sessions WHERE id = ?1",
        )?;

        let session = stmt
            .query_row(params![session_id], Self::session_from_row)
            .optional()?;

        Ok(session)
    }

    /// List all active sessions
    pub fn list_active(&self) -> Result<Vec<TimeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time FROM time_sessions WHERE end_time IS NULL",
        )?;

        let sessions = stmt
            .query_map([], Self::session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// List a user's active sessions, most recently started first
    #[instrument(skip(self, user), fields(id_string = %user.id_string))]
    pub fn list_active_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time FROM time_sessions
             WHERE user_id = ?1 AND start_time IS NOT NULL AND end_time IS NULL
             ORDER BY start_time DESC",
        )?;

        let sessions = stmt
            .query_map(params![user.id], Self::session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// The most recently started active session for a user, if any
    pub fn latest_active_for_user(&self, user: &User) -> Result<Option<TimeSession>> {
        let sessions = self.list_active_for_user(user)?;
        Ok(sessions.into_iter().next())
    }

    /// List a user's completed sessions
    pub fn list_completed_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time FROM time_sessions
             WHERE user_id = ?1 AND end_time IS NOT NULL",
        )?;

        let sessions = stmt
            .query_map(params![user.id], Self::session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// List every session for a user, open or closed
    pub fn list_for_user(&self, user: &User) -> Result<Vec<TimeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, start_time, end_time FROM time_sessions WHERE user_id = ?1",
        )?;

        let sessions = stmt
            .query_map(params![user.id], Self::session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Delete sessions missing a start time or an owner
    ///
    /// Administrative hygiene, never part of the kiosk request flow.
    /// Returns the number of rows deleted.
    #[instrument(skip(self))]
    pub fn purge_invalid(&self) -> Result<usize> {
        let purged = self.conn.execute(
            "DELETE FROM time_sessions WHERE start_time IS NULL OR user_id IS NULL",
            [],
        )?;

        Ok(purged)
    }

    fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimeSession> {
        Ok(TimeSession {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            start_time: parse_datetime_opt(row.get::<_, Option<String>>(2)?)?,
            end_time: parse_datetime_opt(row.get::<_, Option<String>>(3)?)?,
        })
    }
}
