//! Attendance session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single attendance session for a user
///
/// The store assigns `id` on insert. `user_id` and `start_time` are nullable
/// in the store; a row missing either is invalid and eligible for purge.
/// A session is active while `end_time` is absent and completed once both
/// timestamps are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSession {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeSession {
    /// Create an unpersisted session starting at `start_time`
    pub fn new(user_id: i64, start_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id: Some(user_id),
            start_time: Some(start_time),
            end_time: None,
        }
    }

    /// Whether the session is still open
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whether both timestamps are present
    pub fn is_completed(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Whether the row is malformed (missing owner or start time)
    pub fn is_invalid(&self) -> bool {
        self.start_time.is_none() || self.user_id.is_none()
    }

    /// Derived duration: present iff the session is completed
    pub fn total_time(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Set the end time, enforcing the ordering invariant
    ///
    /// The end time must be strictly after the start time; an earlier or
    /// equal end time is refused and the session stays open. Returns whether
    /// the session was closed.
    pub fn finish_at(&mut self, end_time: DateTime<Utc>) -> bool {
        match self.start_time {
            Some(start) if end_time > start => {
                self.end_time = Some(end_time);
                true
            }
            _ => false,
        }
    }
}
