//! Catalog module: wizards, artifacts and the ownership link between them.
//!
//! `Artifact::owner_id` is the single source of truth for ownership; the
//! artifact ids listed on a `Wizard` are derived from it on every read.

pub mod domain;
pub mod repository;
pub mod wizard_service;
pub mod artifact_service;

pub use artifact_service::ArtifactService;
pub use wizard_service::WizardService;
