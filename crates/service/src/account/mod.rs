//! Account module: user provisioning with hashed credentials.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::UserService;
