use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{Artifact, NewWizard, Wizard, WizardId, WizardUpdate};
use super::repository::{ArtifactRepository, WizardRepository};
use crate::errors::{EntityKind, ServiceError};

/// Wizard business service: CRUD plus the artifact ownership transfer.
///
/// Stateless apart from its repository handles; share it freely behind an `Arc`.
pub struct WizardService<W: WizardRepository, A: ArtifactRepository> {
    wizards: Arc<W>,
    artifacts: Arc<A>,
}

impl<W: WizardRepository, A: ArtifactRepository> WizardService<W, A> {
    pub fn new(wizards: Arc<W>, artifacts: Arc<A>) -> Self { Self { wizards, artifacts } }

    pub async fn find_all(&self) -> Result<Vec<Wizard>, ServiceError> {
        self.wizards.find_all().await
    }

    pub async fn find_by_id(&self, id: WizardId) -> Result<Wizard, ServiceError> {
        debug!(wizard_id = id, "wizard_lookup");
        self.wizards
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Wizard, id))
    }

    #[instrument(skip(self, new_wizard), fields(name = %new_wizard.name))]
    pub async fn save(&self, new_wizard: NewWizard) -> Result<Wizard, ServiceError> {
        models::wizard::validate_name(&new_wizard.name)?;
        let created = self.wizards.create(&new_wizard.name).await?;
        info!(wizard_id = created.id, "wizard_created");
        Ok(created)
    }

    /// Overwrite the wizard's name; owned artifacts are untouched.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: WizardId, update: WizardUpdate) -> Result<Wizard, ServiceError> {
        let mut existing = self.find_by_id(id).await?;
        models::wizard::validate_name(&update.name)?;
        existing.name = update.name;
        let saved = self.wizards.save(&existing).await?;
        info!(wizard_id = id, "wizard_updated");
        Ok(saved)
    }

    /// Delete a wizard. Its artifacts stay in the store, unowned.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: WizardId) -> Result<(), ServiceError> {
        let wizard = self.find_by_id(id).await?;
        let detached = self.wizards.detach_and_delete(wizard.id).await?;
        info!(wizard_id = id, detached, "wizard_deleted");
        Ok(())
    }

    /// Transfer ownership of an artifact to a wizard.
    ///
    /// The artifact is looked up first: a missing artifact is reported even
    /// when the wizard id is also invalid, and the wizard store is never
    /// consulted in that case. A missing wizard leaves the artifact with its
    /// previous owner.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::{WizardService, domain::Artifact, repository::mock::InMemoryCatalog};
    /// let store = Arc::new(InMemoryCatalog::default());
    /// store.seed_wizard(2, "Harry Potter");
    /// store.seed_wizard(3, "Neville Longbottom");
    /// store.seed_artifact(Artifact {
    ///     id: "1250808601744904192".into(),
    ///     name: "Invisibility Cloak".into(),
    ///     description: "An invisibility cloak is used to make the wearer invisible.".into(),
    ///     image_url: "ImageUrl".into(),
    ///     owner_id: Some(2),
    /// });
    /// let svc = WizardService::new(store.clone(), store);
    /// let moved = tokio_test::block_on(svc.assign_artifact(3, "1250808601744904192")).unwrap();
    /// assert_eq!(moved.owner_id, Some(3));
    /// ```
    #[instrument(skip(self))]
    pub async fn assign_artifact(&self, wizard_id: WizardId, artifact_id: &str) -> Result<Artifact, ServiceError> {
        let artifact = self
            .artifacts
            .find_by_id(artifact_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, artifact_id))?;

        let wizard = self
            .wizards
            .find_by_id(wizard_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Wizard, wizard_id))?;

        if artifact.owner_id == Some(wizard.id) {
            debug!("artifact already owned by target wizard");
            return Ok(artifact);
        }

        // Detaching from the former owner is implied: ownership is the single owner_id column.
        let assigned = self.artifacts.assign_owner(&artifact.id, wizard.id).await?;
        info!(previous_owner = ?artifact.owner_id, new_owner = wizard.id, "artifact_assigned");
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::InMemoryCatalog;

    const CLOAK: &str = "1250808601744904192";

    fn cloak(owner: Option<WizardId>) -> Artifact {
        Artifact {
            id: CLOAK.into(),
            name: "Invisibility Cloak".into(),
            description: "An invisibility cloak is used to make the wearer invisible.".into(),
            image_url: "ImageUrl".into(),
            owner_id: owner,
        }
    }

    fn setup() -> (Arc<InMemoryCatalog>, WizardService<InMemoryCatalog, InMemoryCatalog>) {
        let store = Arc::new(InMemoryCatalog::default());
        store.seed_wizard(1, "Albus Dumbledore");
        store.seed_wizard(2, "Harry Potter");
        store.seed_wizard(3, "Neville Longbottom");
        let svc = WizardService::new(store.clone(), store.clone());
        (store, svc)
    }

    #[tokio::test]
    async fn find_all_returns_seeded_wizards_in_order() -> Result<(), anyhow::Error> {
        let (_, svc) = setup();
        let all = svc.find_all().await?;
        let got: Vec<(WizardId, &str)> = all.iter().map(|w| (w.id, w.name.as_str())).collect();
        assert_eq!(got, vec![(1, "Albus Dumbledore"), (2, "Harry Potter"), (3, "Neville Longbottom")]);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_success() -> Result<(), anyhow::Error> {
        let (_, svc) = setup();
        let w = svc.find_by_id(1).await?;
        assert_eq!(w.name, "Albus Dumbledore");
        assert_eq!(w.number_of_artifacts(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_not_found() {
        let (_, svc) = setup();
        let err = svc.find_by_id(5).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { kind: EntityKind::Wizard, .. }));
        assert_eq!(err.to_string(), "Could not find wizard with Id 5 :(");
    }

    #[tokio::test]
    async fn save_assigns_id() -> Result<(), anyhow::Error> {
        let (_, svc) = setup();
        let w = svc.save(NewWizard { name: "Hermione Granger".into() }).await?;
        assert_eq!(w.id, 4);
        assert_eq!(w.name, "Hermione Granger");
        assert_eq!(svc.find_all().await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn save_rejects_blank_name() {
        let (_, svc) = setup();
        let err = svc.save(NewWizard { name: "  ".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
    }

    #[tokio::test]
    async fn update_changes_name_only() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        store.seed_artifact(cloak(Some(1)));
        let updated = svc
            .update(1, WizardUpdate { name: "Albus Percival Wulfric Brian Dumbledore".into() })
            .await?;
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Albus Percival Wulfric Brian Dumbledore");
        assert!(updated.owns(CLOAK));
        Ok(())
    }

    #[tokio::test]
    async fn update_not_found() {
        let (_, svc) = setup();
        let err = svc.update(4, WizardUpdate { name: "Hermione Weasley".into() }).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find wizard with Id 4 :(");
    }

    #[tokio::test]
    async fn delete_detaches_owned_artifacts() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        store.seed_artifact(Artifact { id: "a".into(), ..cloak(Some(1)) });
        store.seed_artifact(Artifact { id: "b".into(), ..cloak(Some(1)) });

        svc.delete(1).await?;

        let err = svc.find_by_id(1).await.unwrap_err();
        assert!(err.is_not_found());
        let remaining = ArtifactRepository::find_all(store.as_ref()).await?;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|a| a.owner_id.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn delete_not_found() {
        let (_, svc) = setup();
        let err = svc.delete(4).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find wizard with Id 4 :(");
    }

    #[tokio::test]
    async fn assign_artifact_moves_ownership() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        store.seed_artifact(cloak(Some(2)));

        let moved = svc.assign_artifact(3, CLOAK).await?;
        assert_eq!(moved.owner_id, Some(3));

        let neville = svc.find_by_id(3).await?;
        let harry = svc.find_by_id(2).await?;
        assert!(neville.owns(CLOAK));
        assert!(!harry.owns(CLOAK));
        Ok(())
    }

    #[tokio::test]
    async fn assign_artifact_to_current_owner_is_idempotent() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        store.seed_artifact(cloak(Some(2)));
        let same = svc.assign_artifact(2, CLOAK).await?;
        assert_eq!(same.owner_id, Some(2));
        assert_eq!(store.owner_writes(), 0);
        assert_eq!(svc.find_by_id(2).await?.number_of_artifacts(), 1);

        svc.assign_artifact(3, CLOAK).await?;
        assert_eq!(store.owner_writes(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn assign_artifact_unknown_wizard_keeps_owner() -> Result<(), anyhow::Error> {
        let store = Arc::new(InMemoryCatalog::default());
        store.seed_wizard(2, "Harry Potter");
        store.seed_artifact(cloak(Some(2)));
        let svc = WizardService::new(store.clone(), store.clone());

        let err = svc.assign_artifact(3, CLOAK).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { kind: EntityKind::Wizard, .. }));
        assert_eq!(err.to_string(), "Could not find wizard with Id 3 :(");

        let a = ArtifactRepository::find_by_id(store.as_ref(), CLOAK).await?.unwrap();
        assert_eq!(a.owner_id, Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn assign_artifact_unknown_artifact_skips_wizard_lookup() {
        let (store, svc) = setup();
        let err = svc.assign_artifact(99, CLOAK).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find artifact with Id 1250808601744904192 :(");
        assert_eq!(store.wizard_lookups(), 0);
    }

    #[tokio::test]
    async fn concurrent_assignments_leave_single_owner() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        store.seed_artifact(cloak(Some(1)));
        let svc = Arc::new(svc);

        let mut handles = Vec::new();
        for target in [2, 3, 2, 3, 1, 2] {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move { svc.assign_artifact(target, CLOAK).await }));
        }
        for h in handles {
            h.await??;
        }

        let owners: Vec<Wizard> = svc
            .find_all()
            .await?
            .into_iter()
            .filter(|w| w.owns(CLOAK))
            .collect();
        assert_eq!(owners.len(), 1);
        let a = ArtifactRepository::find_by_id(store.as_ref(), CLOAK).await?.unwrap();
        assert_eq!(a.owner_id, Some(owners[0].id));
        Ok(())
    }
}
