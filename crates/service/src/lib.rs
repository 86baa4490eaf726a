//! Service layer enforcing cross-entity consistency on top of models.
//! - Wizard ownership of artifacts, with transfer and detachment rules.
//! - User accounts with hashed credentials and an authentication bridge.
//! - Persistence behind repository traits (in-memory and SeaORM backed).

pub mod errors;
pub mod auth;
pub mod catalog;
pub mod account;
pub mod crypto;
pub mod idgen;
pub mod repo;
pub mod seed;
#[cfg(test)]
pub mod test_support;
