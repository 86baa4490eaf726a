use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::domain::{NewUser, User, UserId, UserUpdate};
use super::repository::UserRepository;
use crate::auth::{AuthError, Principal, PrincipalResolver};
use crate::crypto::CredentialHasher;
use crate::errors::{EntityKind, ServiceError};

/// User account service. Hashing is an injected capability, applied before
/// anything reaches the repository.
pub struct UserService<R: UserRepository, H: CredentialHasher> {
    repo: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: CredentialHasher> UserService<R, H> {
    pub fn new(repo: Arc<R>, hasher: Arc<H>) -> Self { Self { repo, hasher } }

    pub async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        self.repo.find_all().await
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<User, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, id))
    }

    /// Register a new account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::account::{UserService, domain::NewUser, repository::mock::InMemoryUserRepository};
    /// use service::crypto::{Argon2Hasher, CredentialHasher};
    /// let hasher = Arc::new(Argon2Hasher::with_params(256, 1, 1).unwrap());
    /// let svc = UserService::new(Arc::new(InMemoryUserRepository::default()), hasher.clone());
    /// let input = NewUser { username: "hagrid".into(), password: "plaintext123".into(), enabled: true, role: "user".into() };
    /// let user = tokio_test::block_on(svc.save(input)).unwrap();
    /// assert_ne!(user.password_hash, "plaintext123");
    /// assert!(hasher.verify("plaintext123", &user.password_hash));
    /// ```
    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn save(&self, new_user: NewUser) -> Result<User, ServiceError> {
        models::hogwarts_user::validate_username(&new_user.username)?;
        models::hogwarts_user::validate_role(&new_user.role)?;
        if new_user.password.is_empty() {
            return Err(ServiceError::Validation("password is required".into()));
        }
        if self.repo.find_by_username(&new_user.username).await?.is_some() {
            debug!("username taken");
            return Err(ServiceError::Conflict(format!("username {} already taken", new_user.username)));
        }

        let hash = self.hasher.hash(&new_user.password)?;
        let user = self
            .repo
            .create(&new_user.username, hash, new_user.enabled, &new_user.role)
            .await?;
        info!(user_id = user.id, "user_created");
        Ok(user)
    }

    /// Overwrite username, enabled and role. The password hash is left as stored.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<User, ServiceError> {
        let mut existing = self.find_by_id(id).await?;
        models::hogwarts_user::validate_username(&update.username)?;
        models::hogwarts_user::validate_role(&update.role)?;
        if update.username != existing.username {
            if let Some(other) = self.repo.find_by_username(&update.username).await? {
                if other.id != id {
                    return Err(ServiceError::Conflict(format!("username {} already taken", update.username)));
                }
            }
        }

        existing.username = update.username;
        existing.enabled = update.enabled;
        existing.role = update.role;
        let saved = self.repo.save(&existing).await?;
        info!(user_id = id, enabled = saved.enabled, "user_updated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        self.find_by_id(id).await?;
        self.repo.delete_by_id(id).await?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    /// Resolve and check a username/password pair.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let principal = self.resolve_principal(username).await?;
        if !self.hasher.verify(password, principal.password_hash()) {
            warn!("bad credentials");
            return Err(AuthError::BadCredentials);
        }
        if !principal.is_enabled() {
            return Err(AuthError::Disabled { username: username.to_string() });
        }
        Ok(principal)
    }
}

#[async_trait]
impl<R: UserRepository, H: CredentialHasher> PrincipalResolver for UserService<R, H> {
    async fn resolve_principal(&self, username: &str) -> Result<Principal, AuthError> {
        self.repo
            .find_by_username(username)
            .await?
            .map(Principal::from)
            .ok_or_else(|| AuthError::AccountNotFound { username: username.to_string() })
    }
}
