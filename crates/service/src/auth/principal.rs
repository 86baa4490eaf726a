use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::errors::AuthError;
use crate::account::domain::{User, UserId};

pub const ROLE_PREFIX: &str = "ROLE_";

/// Authentication view of a user account.
#[derive(Clone, Serialize)]
pub struct Principal {
    user_id: UserId,
    username: String,
    #[serde(skip)]
    password_hash: String,
    enabled: bool,
    authority: String,
}

impl Principal {
    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn username(&self) -> &str { &self.username }
    pub fn password_hash(&self) -> &str { &self.password_hash }
    pub fn is_enabled(&self) -> bool { self.enabled }
    /// Role-derived authority, e.g. `ROLE_admin`.
    pub fn authority(&self) -> &str { &self.authority }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        let authority = format!("{ROLE_PREFIX}{}", user.role);
        Self {
            user_id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            enabled: user.enabled,
            authority,
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("enabled", &self.enabled)
            .field("authority", &self.authority)
            .finish()
    }
}

/// "Load principal by username" hook consumed by an authentication framework.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve_principal(&self, username: &str) -> Result<Principal, AuthError>;
}
