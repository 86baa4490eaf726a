use thiserror::Error;

use crate::errors::ServiceError;

/// Errors on the authentication path, separate from the CRUD taxonomy.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username {username} is not found.")]
    AccountNotFound { username: String },
    #[error("account {username} is disabled")]
    Disabled { username: String },
    #[error("invalid credentials")]
    BadCredentials,
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::AccountNotFound { .. } => 1003,
            AuthError::Disabled { .. } => 1005,
            AuthError::BadCredentials => 1004,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<ServiceError> for AuthError {
    fn from(err: ServiceError) -> Self {
        Self::Repository(err.to_string())
    }
}
