//! Sign-in/out toggle workflow
//!
//! Attendance is a two-state machine per user: Out (no active session) and
//! In (an active session exists). The same identification action drives both
//! transitions, keyed off the user's most recently started active session.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::models::{TimeSession, User};
use crate::storage::Database;

/// Outcome of a toggle: the session that was opened or closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Punch {
    In(TimeSession),
    Out(TimeSession),
}

impl Punch {
    /// The session touched by this punch
    pub fn session(&self) -> &TimeSession {
        match self {
            Punch::In(s) | Punch::Out(s) => s,
        }
    }
}

/// The kiosk toggle, bound to a store handle at construction
pub struct TimeClock<'a> {
    db: &'a Database,
}

impl<'a> TimeClock<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Toggle attendance for the user identified by `id_string`
    ///
    /// NotFound if no user carries that ID string.
    #[instrument(skip(self))]
    pub fn punch(&self, id_string: &str, at: Option<DateTime<Utc>>) -> Result<Punch> {
        let user = self
            .db
            .users()
            .find_by_id_string(id_string)?
            .ok_or_else(|| Error::NotFound(format!("no user with id_string {id_string}")))?;

        self.punch_user(&user, at)
    }

    /// Toggle attendance for an already-resolved user
    ///
    /// No active session opens one (clock-in); an active session closes the
    /// most recent one (clock-out). The lookup and the write are separate
    /// store operations; concurrent toggles for the same user can race.
    #[instrument(skip(self, user), fields(id_string = %user.id_string))]
    pub fn punch_user(&self, user: &User, at: Option<DateTime<Utc>>) -> Result<Punch> {
        match self.db.sessions().latest_active_for_user(user)? {
            Some(open) => {
                let closed = self.db.sessions().close(&open, at)?;
                info!(name = %user.name, "Clocked out");
                Ok(Punch::Out(closed))
            }
            None => {
                let opened = self.db.sessions().open(user, at)?;
                info!(name = %user.name, "Clocked in");
                Ok(Punch::In(opened))
            }
        }
    }
}
