use async_trait::async_trait;

use super::domain::{Artifact, Wizard, WizardId};
use crate::errors::ServiceError;

/// Repository abstraction for wizard persistence.
///
/// Returned wizards carry `artifact_ids` derived from the artifact store at
/// read time.
#[async_trait]
pub trait WizardRepository: Send + Sync {
    /// All wizards in store order.
    async fn find_all(&self) -> Result<Vec<Wizard>, ServiceError>;
    async fn find_by_id(&self, id: WizardId) -> Result<Option<Wizard>, ServiceError>;
    async fn create(&self, name: &str) -> Result<Wizard, ServiceError>;
    /// Persist the name of an existing wizard.
    async fn save(&self, wizard: &Wizard) -> Result<Wizard, ServiceError>;
    /// Clear `owner_id` on every owned artifact, then delete the wizard,
    /// as one atomic unit. Returns the number of detached artifacts.
    async fn detach_and_delete(&self, id: WizardId) -> Result<u64, ServiceError>;
}

/// Repository abstraction for artifact persistence.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Artifact>, ServiceError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Artifact>, ServiceError>;
    /// Insert a new artifact. `owner_id` is stored as given.
    async fn insert(&self, artifact: Artifact) -> Result<Artifact, ServiceError>;
    /// Persist descriptive fields of an existing artifact; `owner_id` is not written.
    async fn save(&self, artifact: &Artifact) -> Result<Artifact, ServiceError>;
    /// Point `artifact_id` at `wizard_id` as one atomic unit.
    ///
    /// Fails with `NotFound` if either row is gone by the time the write
    /// happens; nothing changes in that case.
    async fn assign_owner(&self, artifact_id: &str, wizard_id: WizardId) -> Result<Artifact, ServiceError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use crate::errors::EntityKind;

    #[derive(Default)]
    struct CatalogState {
        wizards: Vec<(WizardId, String)>, // store order
        artifacts: Vec<Artifact>,
        last_wizard_id: WizardId,
    }

    impl CatalogState {
        fn derive(&self, id: WizardId, name: &str) -> Wizard {
            let artifact_ids = self
                .artifacts
                .iter()
                .filter(|a| a.owner_id == Some(id))
                .map(|a| a.id.clone())
                .collect();
            Wizard { id, name: name.to_string(), artifact_ids }
        }

        fn has_wizard(&self, id: WizardId) -> bool {
            self.wizards.iter().any(|(wid, _)| *wid == id)
        }
    }

    /// One state behind one lock serves both repositories, so compound
    /// writes are atomic with respect to every other call.
    #[derive(Default)]
    pub struct InMemoryCatalog {
        state: Mutex<CatalogState>,
        wizard_lookups: AtomicUsize,
        owner_writes: AtomicUsize,
    }

    impl InMemoryCatalog {
        fn state(&self) -> MutexGuard<'_, CatalogState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Insert a wizard under a fixed id.
        pub fn seed_wizard(&self, id: WizardId, name: &str) {
            let mut st = self.state();
            st.wizards.push((id, name.to_string()));
            st.last_wizard_id = st.last_wizard_id.max(id);
        }

        /// Insert an artifact as-is, owner included.
        pub fn seed_artifact(&self, artifact: Artifact) {
            self.state().artifacts.push(artifact);
        }

        /// Number of `WizardRepository::find_by_id` calls served so far.
        pub fn wizard_lookups(&self) -> usize {
            self.wizard_lookups.load(Ordering::SeqCst)
        }

        /// Number of ownership writes made through `ArtifactRepository::assign_owner`.
        pub fn owner_writes(&self) -> usize {
            self.owner_writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WizardRepository for InMemoryCatalog {
        async fn find_all(&self) -> Result<Vec<Wizard>, ServiceError> {
            let st = self.state();
            Ok(st.wizards.iter().map(|(id, name)| st.derive(*id, name)).collect())
        }

        async fn find_by_id(&self, id: WizardId) -> Result<Option<Wizard>, ServiceError> {
            self.wizard_lookups.fetch_add(1, Ordering::SeqCst);
            let st = self.state();
            Ok(st.wizards.iter().find(|(wid, _)| *wid == id).map(|(wid, name)| st.derive(*wid, name)))
        }

        async fn create(&self, name: &str) -> Result<Wizard, ServiceError> {
            let mut st = self.state();
            st.last_wizard_id += 1;
            let id = st.last_wizard_id;
            st.wizards.push((id, name.to_string()));
            Ok(Wizard { id, name: name.to_string(), artifact_ids: Default::default() })
        }

        async fn save(&self, wizard: &Wizard) -> Result<Wizard, ServiceError> {
            let mut st = self.state();
            let slot = st
                .wizards
                .iter_mut()
                .find(|(wid, _)| *wid == wizard.id)
                .ok_or_else(|| ServiceError::not_found(EntityKind::Wizard, wizard.id))?;
            slot.1 = wizard.name.clone();
            Ok(st.derive(wizard.id, &wizard.name))
        }

        async fn detach_and_delete(&self, id: WizardId) -> Result<u64, ServiceError> {
            let mut st = self.state();
            let mut detached = 0;
            for a in st.artifacts.iter_mut().filter(|a| a.owner_id == Some(id)) {
                a.owner_id = None;
                detached += 1;
            }
            st.wizards.retain(|(wid, _)| *wid != id);
            Ok(detached)
        }
    }

    #[async_trait]
    impl ArtifactRepository for InMemoryCatalog {
        async fn find_all(&self) -> Result<Vec<Artifact>, ServiceError> {
            Ok(self.state().artifacts.clone())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Artifact>, ServiceError> {
            Ok(self.state().artifacts.iter().find(|a| a.id == id).cloned())
        }

        async fn insert(&self, artifact: Artifact) -> Result<Artifact, ServiceError> {
            let mut st = self.state();
            if st.artifacts.iter().any(|a| a.id == artifact.id) {
                return Err(ServiceError::Conflict(format!("artifact {} already exists", artifact.id)));
            }
            st.artifacts.push(artifact.clone());
            Ok(artifact)
        }

        async fn save(&self, artifact: &Artifact) -> Result<Artifact, ServiceError> {
            let mut st = self.state();
            let slot = st
                .artifacts
                .iter_mut()
                .find(|a| a.id == artifact.id)
                .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, &artifact.id))?;
            slot.name = artifact.name.clone();
            slot.description = artifact.description.clone();
            slot.image_url = artifact.image_url.clone();
            Ok(slot.clone())
        }

        async fn assign_owner(&self, artifact_id: &str, wizard_id: WizardId) -> Result<Artifact, ServiceError> {
            let mut st = self.state();
            if !st.artifacts.iter().any(|a| a.id == artifact_id) {
                return Err(ServiceError::not_found(EntityKind::Artifact, artifact_id));
            }
            if !st.has_wizard(wizard_id) {
                return Err(ServiceError::not_found(EntityKind::Wizard, wizard_id));
            }
            let slot = st
                .artifacts
                .iter_mut()
                .find(|a| a.id == artifact_id)
                .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, artifact_id))?;
            slot.owner_id = Some(wizard_id);
            self.owner_writes.fetch_add(1, Ordering::SeqCst);
            Ok(slot.clone())
        }

        async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
            self.state().artifacts.retain(|a| a.id != id);
            Ok(())
        }
    }
}
