use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{Artifact, ArtifactUpdate, NewArtifact};
use super::repository::ArtifactRepository;
use crate::errors::{EntityKind, ServiceError};
use crate::idgen::IdGenerator;

/// Artifact catalog service. Ownership is never changed here.
pub struct ArtifactService<A: ArtifactRepository, G: IdGenerator> {
    artifacts: Arc<A>,
    ids: Arc<G>,
}

impl<A: ArtifactRepository, G: IdGenerator> ArtifactService<A, G> {
    pub fn new(artifacts: Arc<A>, ids: Arc<G>) -> Self { Self { artifacts, ids } }

    pub async fn find_all(&self) -> Result<Vec<Artifact>, ServiceError> {
        self.artifacts.find_all().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Artifact, ServiceError> {
        self.artifacts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, id))
    }

    /// Store a new, unowned artifact under a freshly generated id.
    #[instrument(skip(self, new_artifact), fields(name = %new_artifact.name))]
    pub async fn save(&self, new_artifact: NewArtifact) -> Result<Artifact, ServiceError> {
        models::artifact::validate(&new_artifact.name, &new_artifact.description, &new_artifact.image_url)?;
        let id = self.ids.next_id()?.to_string();
        let created = self
            .artifacts
            .insert(Artifact {
                id,
                name: new_artifact.name,
                description: new_artifact.description,
                image_url: new_artifact.image_url,
                owner_id: None,
            })
            .await?;
        info!(artifact_id = %created.id, "artifact_created");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &str, update: ArtifactUpdate) -> Result<Artifact, ServiceError> {
        let mut existing = self.find_by_id(id).await?;
        models::artifact::validate(&update.name, &update.description, &update.image_url)?;
        existing.name = update.name;
        existing.description = update.description;
        existing.image_url = update.image_url;
        let saved = self.artifacts.save(&existing).await?;
        info!(artifact_id = %id, "artifact_updated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.find_by_id(id).await?;
        self.artifacts.delete_by_id(id).await?;
        info!(artifact_id = %id, "artifact_deleted");
        Ok(())
    }
}
