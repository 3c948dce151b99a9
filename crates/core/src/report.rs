//! Attendance totals aggregation

use chrono::Duration;
use tracing::instrument;

use crate::error::Result;
use crate::storage::Database;

/// A user's summed attendance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotal {
    pub name: String,
    pub total: Duration,
}

/// Report aggregation over completed sessions
pub struct Aggregator<'a> {
    db: &'a Database,
}

impl<'a> Aggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Total attendance per user, largest first
    ///
    /// Every registered user appears, including those with no completed
    /// sessions. Sessions without a derivable duration count as zero.
    /// Ties keep a stable order.
    #[instrument(skip(self))]
    pub fn totals_by_user(&self) -> Result<Vec<UserTotal>> {
        let mut totals = Vec::new();

        for user in self.db.users().list_all()? {
            let total = self
                .db
                .sessions()
                .list_completed_for_user(&user)?
                .iter()
                .filter_map(|s| s.total_time())
                .fold(Duration::zero(), |acc, d| acc + d);

            totals.push(UserTotal {
                name: user.name,
                total,
            });
        }

        totals.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(totals)
    }
}

/// Render a duration as hours and zero-padded minutes, e.g. `1:15`
pub fn format_duration(d: Duration) -> String {
    format!("{}:{:02}", d.num_hours(), d.num_minutes() % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn completed_session(db: &Database, user: &crate::models::User, minutes: i64) {
        let session = db.sessions().open(user, Some(t0())).unwrap();
        db.sessions()
            .close(&session, Some(t0() + Duration::minutes(minutes)))
            .unwrap();
    }

    #[test]
    fn test_totals_sum_completed_sessions() {
        let db = Database::open_in_memory().unwrap();
        let ada = db.users().create("Ada", "A1").unwrap();

        completed_session(&db, &ada, 30);
        completed_session(&db, &ada, 45);

        let totals = Aggregator::new(&db).totals_by_user().unwrap();
        assert_eq!(
            totals,
            vec![UserTotal {
                name: "Ada".to_string(),
                total: Duration::minutes(75),
            }]
        );
    }

    #[test]
    fn test_totals_sorted_descending() {
        let db = Database::open_in_memory().unwrap();
        let ada = db.users().create("Ada", "A1").unwrap();
        let bo = db.users().create("Bo", "B1").unwrap();

        completed_session(&db, &ada, 30);
        completed_session(&db, &bo, 90);

        let totals = Aggregator::new(&db).totals_by_user().unwrap();
        assert_eq!(totals[0].name, "Bo");
        assert_eq!(totals[1].name, "Ada");
    }

    #[test]
    fn test_totals_invariant_under_insertion_order() {
        let build = |swap: bool| {
            let db = Database::open_in_memory().unwrap();
            let ada = db.users().create("Ada", "A1").unwrap();
            let bo = db.users().create("Bo", "B1").unwrap();
            if swap {
                completed_session(&db, &bo, 90);
                completed_session(&db, &ada, 30);
                completed_session(&db, &ada, 15);
            } else {
                completed_session(&db, &ada, 15);
                completed_session(&db, &ada, 30);
                completed_session(&db, &bo, 90);
            }
            Aggregator::new(&db).totals_by_user().unwrap()
        };

        assert_eq!(build(false), build(true));
    }

    #[test]
    fn test_user_without_sessions_counts_zero() {
        let db = Database::open_in_memory().unwrap();
        let ada = db.users().create("Ada", "A1").unwrap();
        db.users().create("Idle", "I1").unwrap();

        completed_session(&db, &ada, 60);
        // Open sessions have no derivable duration
        db.sessions()
            .open(&ada, Some(t0() + Duration::hours(3)))
            .unwrap();

        let totals = Aggregator::new(&db).totals_by_user().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Ada");
        assert_eq!(totals[0].total, Duration::hours(1));
        assert_eq!(totals[1].name, "Idle");
        assert_eq!(totals[1].total, Duration::zero());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(75)), "1:15");
        assert_eq!(format_duration(Duration::minutes(5)), "0:05");
        assert_eq!(format_duration(Duration::hours(26)), "26:00");
        assert_eq!(format_duration(Duration::zero()), "0:00");
    }
}
