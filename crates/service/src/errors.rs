use std::fmt;

use models::errors::ModelError;
use thiserror::Error;

/// Entity kinds reported by `ServiceError::NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Wizard,
    Artifact,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Wizard => "wizard",
            EntityKind::Artifact => "artifact",
            EntityKind::User => "user",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not find {kind} with Id {id} :(")]
    NotFound { kind: EntityKind, id: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("id generation error: {0}")]
    IdGeneration(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[source] ModelError),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::NotFound { .. } => 2001,
            ServiceError::Validation(_) => 2002,
            ServiceError::Conflict(_) => 2003,
            ServiceError::Model(_) => 2004,
            ServiceError::Hash(_) => 2101,
            ServiceError::IdGeneration(_) => 2102,
            ServiceError::Db(_) => 2200,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Duplicate(msg) => Self::Conflict(msg),
            other => Self::Model(other),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        match ModelError::from(err) {
            ModelError::Duplicate(msg) => Self::Conflict(msg),
            ModelError::Db(msg) | ModelError::Validation(msg) => Self::Db(msg),
        }
    }
}
