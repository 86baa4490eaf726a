//! SeaORM entities for the artifact catalog plus model-level validation.

pub mod errors;
pub mod db;
pub mod wizard;
pub mod artifact;
pub mod hogwarts_user;

#[cfg(test)]
mod tests;
