use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User, UserChanges},
};

/// Process-local store used for `memory://` and in tests.
/// Records are kept in insertion order.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn set_premium(&self, email: &str, premium: bool) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.premium = premium;
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        // uniqueness is checked under the same write lock as the push
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        let now = OffsetDateTime::now_utc();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            date_of_birth: user.date_of_birth,
            role: user.role,
            image_url: user.image_url,
            premium: false,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn update_by_email(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.email == email) else {
            return Ok(None);
        };
        changes.apply_to(user);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }
}
