//! Credential hashing capability injected into the account service.

pub mod argon;

pub use argon::Argon2Hasher;

use crate::errors::ServiceError;

/// One-way transform of a plaintext secret into a storable hash.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, ServiceError>;
    /// True only when `plaintext` produced `hash`.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}
