use async_trait::async_trait;

use super::domain::{User, UserId};
use crate::errors::ServiceError;

/// Repository abstraction for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, ServiceError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    /// Insert a new account; the store assigns the id.
    async fn create(&self, username: &str, password_hash: String, enabled: bool, role: &str) -> Result<User, ServiceError>;
    /// Persist username, enabled and role. The stored hash is not written.
    async fn save(&self, user: &User) -> Result<User, ServiceError>;
    async fn delete_by_id(&self, id: UserId) -> Result<(), ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use crate::errors::EntityKind;

    #[derive(Default)]
    struct UserState {
        users: Vec<User>, // store order
        last_id: UserId,
    }

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        state: Mutex<UserState>,
    }

    impl InMemoryUserRepository {
        fn state(&self) -> MutexGuard<'_, UserState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
            Ok(self.state().users.clone())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ServiceError> {
            Ok(self.state().users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
            Ok(self.state().users.iter().find(|u| u.username == username).cloned())
        }

        async fn create(&self, username: &str, password_hash: String, enabled: bool, role: &str) -> Result<User, ServiceError> {
            let mut st = self.state();
            if st.users.iter().any(|u| u.username == username) {
                return Err(ServiceError::Conflict(format!("username {username} already taken")));
            }
            st.last_id += 1;
            let user = User { id: st.last_id, username: username.to_string(), password_hash, enabled, role: role.to_string() };
            st.users.push(user.clone());
            Ok(user)
        }

        async fn save(&self, user: &User) -> Result<User, ServiceError> {
            let mut st = self.state();
            if st.users.iter().any(|u| u.username == user.username && u.id != user.id) {
                return Err(ServiceError::Conflict(format!("username {} already taken", user.username)));
            }
            let slot = st
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| ServiceError::not_found(EntityKind::User, user.id))?;
            slot.username = user.username.clone();
            slot.enabled = user.enabled;
            slot.role = user.role.clone();
            Ok(slot.clone())
        }

        async fn delete_by_id(&self, id: UserId) -> Result<(), ServiceError> {
            self.state().users.retain(|u| u.id != id);
            Ok(())
        }
    }
}
