//! Demo data for a fresh catalog.

use tracing::{info, instrument};

use crate::account::domain::NewUser;
use crate::account::repository::UserRepository;
use crate::account::UserService;
use crate::catalog::domain::{NewArtifact, NewWizard};
use crate::catalog::repository::{ArtifactRepository, WizardRepository};
use crate::catalog::{ArtifactService, WizardService};
use crate::crypto::CredentialHasher;
use crate::errors::ServiceError;
use crate::idgen::IdGenerator;

const ARTIFACTS: [(&str, &str); 6] = [
    ("Deluminator", "A Deluminator is a device invented by Albus Dumbledore that resembles a cigarette lighter. It is used to remove or absorb (as well as return) the light from any light source to provide cover to the user."),
    ("Invisibility Cloak", "An invisibility cloak is used to make the wearer invisible."),
    ("Elder Wand", "The Elder Wand, known throughout history as the Deathstick or the Wand of Destiny, is an extremely powerful wand made of elder wood with a core of Thestral tail hair."),
    ("The Marauder's Map", "A magical map of Hogwarts created by Remus Lupin, Peter Pettigrew, Sirius Black, and James Potter while they were students at Hogwarts."),
    ("The Sword Of Gryffindor", "A goblin-made sword adorned with large rubies on the pommel. It was once owned by Godric Gryffindor, one of the medieval founders of Hogwarts."),
    ("Resurrection Stone", "The Resurrection Stone allows the holder to bring back deceased loved ones, in a semi-physical form, and communicate with them."),
];

/// Wizard name and the indices into `ARTIFACTS` it ends up owning.
const WIZARDS: [(&str, &[usize]); 3] = [
    ("Albus Dumbledore", &[0, 2]),
    ("Harry Potter", &[1, 3]),
    ("Neville Longbottom", &[4]),
];

const USERS: [(&str, &str, bool, &str); 3] = [
    ("john", "123456", true, "admin"),
    ("eric", "654321", true, "user"),
    ("tom", "qwerty", false, "user"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub wizards: usize,
    pub artifacts: usize,
    pub users: usize,
}

/// Populate wizards, artifacts and users. Does nothing when any wizard
/// already exists and returns `Ok(None)` in that case.
#[instrument(skip_all)]
pub async fn seed_demo_data<W, A, G, R, H>(
    wizards: &WizardService<W, A>,
    artifacts: &ArtifactService<A, G>,
    users: &UserService<R, H>,
) -> Result<Option<SeedReport>, ServiceError>
where
    W: WizardRepository,
    A: ArtifactRepository,
    G: IdGenerator,
    R: UserRepository,
    H: CredentialHasher,
{
    if !wizards.find_all().await?.is_empty() {
        info!("catalog not empty, skipping demo data");
        return Ok(None);
    }

    let mut artifact_ids = Vec::with_capacity(ARTIFACTS.len());
    for (name, description) in ARTIFACTS {
        let a = artifacts
            .save(NewArtifact { name: name.into(), description: description.into(), image_url: "ImageUrl".into() })
            .await?;
        artifact_ids.push(a.id);
    }

    for (name, owned) in WIZARDS {
        let w = wizards.save(NewWizard { name: name.into() }).await?;
        for &idx in owned {
            wizards.assign_artifact(w.id, &artifact_ids[idx]).await?;
        }
    }

    for (username, password, enabled, role) in USERS {
        users
            .save(NewUser { username: username.into(), password: password.into(), enabled, role: role.into() })
            .await?;
    }

    let report = SeedReport { wizards: WIZARDS.len(), artifacts: artifact_ids.len(), users: USERS.len() };
    info!(?report, "demo data seeded");
    Ok(Some(report))
}
