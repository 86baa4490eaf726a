//! Authentication bridge: resolves principals for an external auth framework.
//!
//! The account service implements `PrincipalResolver`; framework adapters
//! translate `AuthError::AccountNotFound` into their own "account missing" signal.

pub mod errors;
pub mod principal;

pub use errors::AuthError;
pub use principal::{Principal, PrincipalResolver};
