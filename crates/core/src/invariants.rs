//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::TimeSession;

/// Validate that a session's state is internally consistent
pub fn assert_session_invariants(session: &TimeSession) {
    // A completed session's end must be strictly after its start
    if let (Some(start), Some(end)) = (session.start_time, session.end_time) {
        debug_assert!(
            end > start,
            "Session {:?} has end {} not after start {}",
            session.id,
            end,
            start
        );
    }

    // The derived total exists exactly for completed sessions
    debug_assert_eq!(
        session.total_time().is_some(),
        session.is_completed(),
        "Session {:?} total/completion mismatch",
        session.id
    );

    // A closed session must have been started
    debug_assert!(
        !(session.end_time.is_some() && session.start_time.is_none()),
        "Session {:?} has an end time but no start time",
        session.id
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_consistent_sessions_pass() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();

        let mut session = TimeSession::new(1, t0);
        assert_session_invariants(&session);

        session.finish_at(t0 + Duration::hours(1));
        assert_session_invariants(&session);
    }
}
