use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type WizardId = i32;

/// Wizard with its owned artifact ids derived from `Artifact::owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    pub id: WizardId,
    pub name: String,
    #[serde(default)]
    pub artifact_ids: BTreeSet<String>,
}

impl Wizard {
    pub fn number_of_artifacts(&self) -> usize {
        self.artifact_ids.len()
    }

    pub fn owns(&self, artifact_id: &str) -> bool {
        self.artifact_ids.contains(artifact_id)
    }
}

/// Wizard creation input; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWizard {
    pub name: String,
}

/// Fields a wizard update may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardUpdate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// 64-bit generated identifier rendered as decimal text
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner_id: Option<WizardId>,
}

impl Artifact {
    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArtifact {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Descriptive fields only; ownership moves through `WizardService::assign_artifact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactUpdate {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

impl From<models::artifact::Model> for Artifact {
    fn from(m: models::artifact::Model) -> Self {
        Self { id: m.id, name: m.name, description: m.description, image_url: m.image_url, owner_id: m.owner_id }
    }
}
