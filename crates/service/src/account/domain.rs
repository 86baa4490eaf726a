use std::fmt;

use serde::{Deserialize, Serialize};

pub type UserId = i32;

/// Stored user account. `password_hash` is never plaintext.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub enabled: bool,
    pub role: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl From<models::hogwarts_user::Model> for User {
    fn from(m: models::hogwarts_user::Model) -> Self {
        Self { id: m.id, username: m.username, password_hash: m.password_hash, enabled: m.enabled, role: m.role }
    }
}

/// Registration input carrying the plaintext password.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub enabled: bool,
    pub role: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Fields an account update may change. The password is not one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub username: String,
    pub enabled: bool,
    pub role: String,
}
