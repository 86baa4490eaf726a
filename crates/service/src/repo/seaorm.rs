use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use models::{artifact, hogwarts_user, wizard};

use crate::account::domain::{User, UserId};
use crate::account::repository::UserRepository;
use crate::catalog::domain::{Artifact, Wizard, WizardId};
use crate::catalog::repository::{ArtifactRepository, WizardRepository};
use crate::errors::{EntityKind, ServiceError};

/// Wizards and artifacts stored in the `wizard` / `artifact` tables.
#[derive(Clone)]
pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

async fn owned_ids<C: ConnectionTrait>(db: &C, wizard_id: WizardId) -> Result<BTreeSet<String>, ServiceError> {
    let rows = artifact::Entity::find()
        .filter(artifact::Column::OwnerId.eq(wizard_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|a| a.id).collect())
}

fn to_wizard(m: wizard::Model, artifact_ids: BTreeSet<String>) -> Wizard {
    Wizard { id: m.id, name: m.name, artifact_ids }
}

#[async_trait]
impl WizardRepository for SeaOrmCatalogRepository {
    async fn find_all(&self) -> Result<Vec<Wizard>, ServiceError> {
        let wizards = wizard::Entity::find().order_by_asc(wizard::Column::Id).all(&self.db).await?;
        let owned = artifact::Entity::find()
            .filter(artifact::Column::OwnerId.is_not_null())
            .all(&self.db)
            .await?;

        let mut by_owner: HashMap<WizardId, BTreeSet<String>> = HashMap::new();
        for a in owned {
            if let Some(owner) = a.owner_id {
                by_owner.entry(owner).or_default().insert(a.id);
            }
        }
        Ok(wizards
            .into_iter()
            .map(|w| {
                let ids = by_owner.remove(&w.id).unwrap_or_default();
                to_wizard(w, ids)
            })
            .collect())
    }

    async fn find_by_id(&self, id: WizardId) -> Result<Option<Wizard>, ServiceError> {
        match wizard::Entity::find_by_id(id).one(&self.db).await? {
            Some(w) => {
                let ids = owned_ids(&self.db, w.id).await?;
                Ok(Some(to_wizard(w, ids)))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, name: &str) -> Result<Wizard, ServiceError> {
        let created = wizard::create(&self.db, name).await?;
        Ok(to_wizard(created, BTreeSet::new()))
    }

    async fn save(&self, w: &Wizard) -> Result<Wizard, ServiceError> {
        let existing = wizard::Entity::find_by_id(w.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Wizard, w.id))?;
        let mut am = existing.into_active_model();
        am.name = Set(w.name.clone());
        let updated = am.update(&self.db).await?;
        let ids = owned_ids(&self.db, updated.id).await?;
        Ok(to_wizard(updated, ids))
    }

    async fn detach_and_delete(&self, id: WizardId) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;
        let detached = artifact::detach_all(&txn, id).await?;
        let res = wizard::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            // dropping txn rolls back the detachment
            return Err(ServiceError::not_found(EntityKind::Wizard, id));
        }
        txn.commit().await?;
        debug!(wizard_id = id, detached, "wizard row removed");
        Ok(detached)
    }
}

#[async_trait]
impl ArtifactRepository for SeaOrmCatalogRepository {
    async fn find_all(&self) -> Result<Vec<Artifact>, ServiceError> {
        let rows = artifact::Entity::find().order_by_asc(artifact::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(Artifact::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Artifact>, ServiceError> {
        let row = artifact::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(row.map(Artifact::from))
    }

    async fn insert(&self, a: Artifact) -> Result<Artifact, ServiceError> {
        if artifact::Entity::find_by_id(a.id.clone()).one(&self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!("artifact {} already exists", a.id)));
        }
        let am = artifact::ActiveModel {
            id: Set(a.id),
            name: Set(a.name),
            description: Set(a.description),
            image_url: Set(a.image_url),
            owner_id: Set(a.owner_id),
        };
        Ok(am.insert(&self.db).await?.into())
    }

    async fn save(&self, a: &Artifact) -> Result<Artifact, ServiceError> {
        let existing = artifact::Entity::find_by_id(a.id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, &a.id))?;
        let mut am = existing.into_active_model();
        am.name = Set(a.name.clone());
        am.description = Set(a.description.clone());
        am.image_url = Set(a.image_url.clone());
        Ok(am.update(&self.db).await?.into())
    }

    async fn assign_owner(&self, artifact_id: &str, wizard_id: WizardId) -> Result<Artifact, ServiceError> {
        let txn = self.db.begin().await?;
        // row lock serializes competing transfers of the same artifact (no-op on sqlite)
        let row = artifact::Entity::find_by_id(artifact_id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Artifact, artifact_id))?;
        if wizard::Entity::find_by_id(wizard_id).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Wizard, wizard_id));
        }

        let mut am = row.into_active_model();
        am.owner_id = Set(Some(wizard_id));
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(updated.into())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        artifact::Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(())
    }
}

/// Accounts stored in the `hogwarts_user` table.
#[derive(Clone)]
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn username_taken_by_other(&self, username: &str, id: Option<UserId>) -> Result<bool, ServiceError> {
        let found = hogwarts_user::find_by_username(&self.db, username).await?;
        Ok(matches!(found, Some(u) if Some(u.id) != id))
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        let rows = hogwarts_user::Entity::find().order_by_asc(hogwarts_user::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ServiceError> {
        Ok(hogwarts_user::Entity::find_by_id(id).one(&self.db).await?.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(hogwarts_user::find_by_username(&self.db, username).await?.map(User::from))
    }

    async fn create(&self, username: &str, password_hash: String, enabled: bool, role: &str) -> Result<User, ServiceError> {
        if self.username_taken_by_other(username, None).await? {
            return Err(ServiceError::Conflict(format!("username {username} already taken")));
        }
        let created = hogwarts_user::create(&self.db, username, password_hash, enabled, role).await?;
        Ok(created.into())
    }

    async fn save(&self, user: &User) -> Result<User, ServiceError> {
        if self.username_taken_by_other(&user.username, Some(user.id)).await? {
            return Err(ServiceError::Conflict(format!("username {} already taken", user.username)));
        }
        let existing = hogwarts_user::Entity::find_by_id(user.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, user.id))?;
        let mut am = existing.into_active_model();
        am.username = Set(user.username.clone());
        am.enabled = Set(user.enabled);
        am.role = Set(user.role.clone());
        Ok(am.update(&self.db).await?.into())
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), ServiceError> {
        hogwarts_user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::account::domain::{NewUser, UserUpdate};
    use crate::account::UserService;
    use crate::catalog::domain::{NewArtifact, NewWizard};
    use crate::catalog::{ArtifactService, WizardService};
    use crate::idgen::SnowflakeIdWorker;
    use crate::test_support::{fast_hasher, get_db};

    async fn catalog() -> Result<(Arc<SeaOrmCatalogRepository>, WizardService<SeaOrmCatalogRepository, SeaOrmCatalogRepository>, ArtifactService<SeaOrmCatalogRepository, SnowflakeIdWorker>), anyhow::Error> {
        let repo = Arc::new(SeaOrmCatalogRepository::new(get_db().await?));
        let ids = Arc::new(SnowflakeIdWorker::new(0, 0)?);
        Ok((repo.clone(), WizardService::new(repo.clone(), repo.clone()), ArtifactService::new(repo, ids)))
    }

    fn cloak() -> NewArtifact {
        NewArtifact {
            name: "Invisibility Cloak".into(),
            description: "An invisibility cloak is used to make the wearer invisible.".into(),
            image_url: "ImageUrl".into(),
        }
    }

    #[tokio::test]
    async fn assign_moves_between_wizards() -> Result<(), anyhow::Error> {
        let (_, wizards, artifacts) = catalog().await?;
        let harry = wizards.save(NewWizard { name: "Harry Potter".into() }).await?;
        let neville = wizards.save(NewWizard { name: "Neville Longbottom".into() }).await?;
        let a = artifacts.save(cloak()).await?;
        assert_eq!(a.owner_id, None);

        wizards.assign_artifact(harry.id, &a.id).await?;
        assert!(wizards.find_by_id(harry.id).await?.owns(&a.id));

        let moved = wizards.assign_artifact(neville.id, &a.id).await?;
        assert_eq!(moved.owner_id, Some(neville.id));
        assert!(!wizards.find_by_id(harry.id).await?.owns(&a.id));
        assert_eq!(wizards.find_by_id(neville.id).await?.number_of_artifacts(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn assign_to_missing_wizard_keeps_owner() -> Result<(), anyhow::Error> {
        let (_, wizards, artifacts) = catalog().await?;
        let harry = wizards.save(NewWizard { name: "Harry Potter".into() }).await?;
        let a = artifacts.save(cloak()).await?;
        wizards.assign_artifact(harry.id, &a.id).await?;

        let err = wizards.assign_artifact(harry.id + 100, &a.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Could not find wizard with Id {} :(", harry.id + 100));
        assert_eq!(artifacts.find_by_id(&a.id).await?.owner_id, Some(harry.id));
        Ok(())
    }

    #[tokio::test]
    async fn assign_missing_artifact_reports_artifact() -> Result<(), anyhow::Error> {
        let (_, wizards, _) = catalog().await?;
        let err = wizards.assign_artifact(42, "1250808601744904192").await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find artifact with Id 1250808601744904192 :(");
        Ok(())
    }

    #[tokio::test]
    async fn delete_wizard_detaches_artifacts() -> Result<(), anyhow::Error> {
        let (repo, wizards, artifacts) = catalog().await?;
        let albus = wizards.save(NewWizard { name: "Albus Dumbledore".into() }).await?;
        let a = artifacts.save(cloak()).await?;
        let b = artifacts.save(cloak()).await?;
        wizards.assign_artifact(albus.id, &a.id).await?;
        wizards.assign_artifact(albus.id, &b.id).await?;

        wizards.delete(albus.id).await?;
        assert!(wizards.find_by_id(albus.id).await.unwrap_err().is_not_found());
        let all = ArtifactRepository::find_all(repo.as_ref()).await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|a| a.owner_id.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn detach_and_delete_missing_wizard_rolls_back() -> Result<(), anyhow::Error> {
        let (repo, _, _) = catalog().await?;
        let err = repo.detach_and_delete(77).await.unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn find_all_groups_owned_artifacts() -> Result<(), anyhow::Error> {
        let (_, wizards, artifacts) = catalog().await?;
        let albus = wizards.save(NewWizard { name: "Albus Dumbledore".into() }).await?;
        let harry = wizards.save(NewWizard { name: "Harry Potter".into() }).await?;
        let a = artifacts.save(cloak()).await?;
        let b = artifacts.save(cloak()).await?;
        let c = artifacts.save(cloak()).await?;
        wizards.assign_artifact(albus.id, &a.id).await?;
        wizards.assign_artifact(albus.id, &b.id).await?;
        wizards.assign_artifact(harry.id, &c.id).await?;

        let all = wizards.find_all().await?;
        assert_eq!(all.iter().map(|w| w.id).collect::<Vec<_>>(), vec![albus.id, harry.id]);
        assert_eq!(all[0].number_of_artifacts(), 2);
        assert!(all[1].owns(&c.id));
        Ok(())
    }

    #[tokio::test]
    async fn artifact_update_keeps_owner() -> Result<(), anyhow::Error> {
        let (_, wizards, artifacts) = catalog().await?;
        let harry = wizards.save(NewWizard { name: "Harry Potter".into() }).await?;
        let a = artifacts.save(cloak()).await?;
        wizards.assign_artifact(harry.id, &a.id).await?;

        let updated = artifacts
            .update(&a.id, crate::catalog::domain::ArtifactUpdate { name: "Cloak".into(), description: "Hides".into(), image_url: "u".into() })
            .await?;
        assert_eq!(updated.name, "Cloak");
        assert_eq!(updated.owner_id, Some(harry.id));
        Ok(())
    }

    #[tokio::test]
    async fn user_roundtrip_keeps_hash_on_update() -> Result<(), anyhow::Error> {
        let repo = Arc::new(SeaOrmUserRepository::new(get_db().await?));
        let hasher = Arc::new(fast_hasher());
        let svc = UserService::new(repo, hasher);

        let user = svc
            .save(NewUser { username: "hagrid".into(), password: "plaintext123".into(), enabled: true, role: "user".into() })
            .await?;
        let updated = svc
            .update(user.id, UserUpdate { username: "rubeus".into(), enabled: false, role: "admin".into() })
            .await?;
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(svc.find_by_id(user.id).await?.username, "rubeus");
        assert!(svc.find_all().await?.iter().all(|u| u.username != "hagrid"));
        Ok(())
    }

    #[tokio::test]
    async fn user_duplicate_username_conflicts() -> Result<(), anyhow::Error> {
        let repo = SeaOrmUserRepository::new(get_db().await?);
        repo.create("john", "$argon2id$x".into(), true, "admin").await?;
        let err = repo.create("john", "$argon2id$y".into(), true, "user").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unique_index_violation_surfaces_as_conflict() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let repo = SeaOrmUserRepository::new(db.clone());
        repo.create("john", "$argon2id$x".into(), true, "admin").await?;

        // a concurrent writer that passed the pre-check hits the unique index instead
        let raced = hogwarts_user::create(&db, "john", "$argon2id$y".into(), true, "user").await.unwrap_err();
        assert!(matches!(ServiceError::from(raced), ServiceError::Conflict(_)));
        assert_eq!(repo.find_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn user_delete_removes_row() -> Result<(), anyhow::Error> {
        let repo = SeaOrmUserRepository::new(get_db().await?);
        let u = repo.create("eric", "$argon2id$x".into(), true, "user").await?;
        repo.delete_by_id(u.id).await?;
        assert!(repo.find_by_id(u.id).await?.is_none());
        assert!(repo.find_by_username("eric").await?.is_none());
        Ok(())
    }
}
