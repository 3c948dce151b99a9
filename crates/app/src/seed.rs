//! Development sample data
//!
//! Reseeds the store with a handful of users and a few days of completed
//! sessions each, so the report and status views have something to show.

use chrono::{Duration, Utc};
use rand::Rng;

use punchdesk_core::{Database, Result};

const SAMPLE_USERS: &[(&str, &str)] = &[
    ("John Smith", "12345678"),
    ("Tim Cook", "thisismyid"),
    ("Bill Gates", "qwerty"),
    ("Bobby Tables", "987654321"),
];

/// Insert the sample users, each with four completed sessions on a
/// two-day stride into the past
pub fn seed_sample_data(db: &Database) -> Result<()> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    for (name, id_string) in SAMPLE_USERS {
        let user = db.users().create(name, id_string)?;

        for stride in 0..4 {
            let start = now
                - Duration::days(2 * stride)
                - Duration::seconds(rng.gen_range(7200..86400));
            let session = db.sessions().open(&user, Some(start))?;
            db.sessions()
                .close(&session, Some(start + Duration::seconds(rng.gen_range(1800..7200))))?;
        }
    }

    tracing::info!(users = SAMPLE_USERS.len(), "Seeded sample data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use punchdesk_core::Aggregator;

    #[test]
    fn test_seed_creates_users_with_completed_sessions() {
        let db = Database::open_in_memory().unwrap();
        seed_sample_data(&db).unwrap();

        let users = db.users().list_all().unwrap();
        assert_eq!(users.len(), SAMPLE_USERS.len());

        for user in &users {
            let completed = db.sessions().list_completed_for_user(user).unwrap();
            assert_eq!(completed.len(), 4);
        }

        // Nothing left open, everyone shows up in the report
        assert!(db.sessions().list_active().unwrap().is_empty());
        let totals = Aggregator::new(&db).totals_by_user().unwrap();
        assert_eq!(totals.len(), SAMPLE_USERS.len());
        assert!(totals.iter().all(|t| t.total > Duration::zero()));
    }
}
