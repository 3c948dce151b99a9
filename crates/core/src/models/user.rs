//! User model

use serde::{Deserialize, Serialize};

/// A registered kiosk user
///
/// `id` is the store-assigned key and is absent until the user has been
/// persisted. `id_string` is the external identifier typed (or scanned) at
/// the kiosk and must be unique across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub id_string: String,
}

impl User {
    /// Create an unpersisted user
    pub fn new(name: impl Into<String>, id_string: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            id_string: id_string.into(),
        }
    }

    /// Whether this user has been assigned a store key
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_key() {
        let user = User::new("Ada", "A1");
        assert!(user.id.is_none());
        assert!(!user.is_persisted());
        assert_eq!(user.name, "Ada");
        assert_eq!(user.id_string, "A1");
    }
}
