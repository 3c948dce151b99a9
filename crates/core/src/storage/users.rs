//! User registry storage operations

use rusqlite::{params, Connection};
use tracing::{instrument, warn};

use super::parse::OptionalExt;
use crate::error::{Error, Result};
use crate::models::User;

pub struct UserStore<'a> {
    conn: &'a Connection,
}

/// Convert a UNIQUE-constraint failure on `id_string` into a Conflict
///
/// Any other storage error propagates unchanged.
fn map_id_string_conflict(e: rusqlite::Error, id_string: &str) -> Error {
    if let rusqlite::Error::SqliteFailure(f, _) = &e {
        if f.code == rusqlite::ErrorCode::ConstraintViolation {
            warn!(id_string = %id_string, "User already exists with this id_string");
            return Error::Conflict(format!("user already exists with id_string {id_string}"));
        }
    }
    Error::Database(e)
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new user, returning it with its assigned key
    ///
    /// Fails with Conflict if the id_string is already taken; nothing is
    /// written in that case.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str, id_string: &str) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (name, id_string) VALUES (?1, ?2)",
                params![name, id_string],
            )
            .map_err(|e| map_id_string_conflict(e, id_string))?;

        Ok(User {
            id: Some(self.conn.last_insert_rowid()),
            name: name.to_string(),
            id_string: id_string.to_string(),
        })
    }

    /// Find a user by their external ID string
    #[instrument(skip(self))]
    pub fn find_by_id_string(&self, id_string: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, id_string FROM users WHERE id_string = ?1")?;

        let user = stmt
            .query_row(params![id_string], |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    id_string: row.get(2)?,
                })
            })
            .optional()?;

        Ok(user)
    }

    /// Find a user by their store key
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, id_string FROM users WHERE id = ?1")?;

        let user = stmt
            .query_row(params![id], |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    id_string: row.get(2)?,
                })
            })
            .optional()?;

        Ok(user)
    }

    /// List all registered users
    pub fn list_all(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare("SELECT id, name, id_string FROM users")?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    id_string: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update a user's name and id_string
    ///
    /// The user must already be persisted. Fails with Conflict if the new
    /// id_string collides with a different user.
    #[instrument(skip(self, user), fields(id_string = %user.id_string))]
    pub fn update(&self, user: &User) -> Result<User> {
        let id = user
            .id
            .ok_or_else(|| Error::NotFound("user has no store key".to_string()))?;

        let changed = self
            .conn
            .execute(
                "UPDATE users SET name = ?1, id_string = ?2 WHERE id = ?3",
                params![user.name, user.id_string, id],
            )
            .map_err(|e| map_id_string_conflict(e, &user.id_string))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("no user with id {id}")));
        }

        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_create_then_find() {
        let db = Database::open_in_memory().unwrap();

        let created = db.users().create("Ada", "A1").unwrap();
        assert!(created.id.is_some());

        let found = db.users().find_by_id_string("A1").unwrap().unwrap();
        assert_eq!(found, created);

        let by_key = db.users().find_by_id(created.id.unwrap()).unwrap().unwrap();
        assert_eq!(by_key, created);
    }

    #[test]
    fn test_duplicate_id_string_is_conflict() {
        let db = Database::open_in_memory().unwrap();

        db.users().create("Ada", "A1").unwrap();
        let err = db.users().create("Impostor", "A1").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Registry unchanged
        assert_eq!(db.users().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_find_unknown_is_none() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.users().find_by_id_string("nobody").unwrap().is_none());
        assert!(db.users().find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_update_renames_user() {
        let db = Database::open_in_memory().unwrap();

        let mut user = db.users().create("Ada", "A1").unwrap();
        user.name = "Ada Lovelace".to_string();
        user.id_string = "A2".to_string();
        db.users().update(&user).unwrap();

        assert!(db.users().find_by_id_string("A1").unwrap().is_none());
        let found = db.users().find_by_id_string("A2").unwrap().unwrap();
        assert_eq!(found.name, "Ada Lovelace");
    }

    #[test]
    fn test_update_unpersisted_is_not_found() {
        let db = Database::open_in_memory().unwrap();

        let user = User::new("Ghost", "G1");
        let err = db.users().update(&user).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_update_collision_is_conflict() {
        let db = Database::open_in_memory().unwrap();

        db.users().create("Ada", "A1").unwrap();
        let mut bo = db.users().create("Bo", "B1").unwrap();
        bo.id_string = "A1".to_string();

        let err = db.users().update(&bo).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Bo keeps the old id_string
        let found = db.users().find_by_id_string("B1").unwrap().unwrap();
        assert_eq!(found.name, "Bo");
    }
}
