//! In-memory user store, used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::UserStore,
    repo_types::{NewUser, UserRecord},
};
use crate::error::{ApiError, ApiResult};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn remove(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> ApiResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(ApiError::DuplicateEmail);
        }
        let record = user.into_record();
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> ApiResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&user_id).map(|u| {
            if !u.favorite_offer_ids.contains(&offer_id) {
                u.favorite_offer_ids.push(offer_id);
            }
            u.clone()
        }))
    }

    async fn remove_favorite(
        &self,
        user_id: Uuid,
        offer_id: Uuid,
    ) -> ApiResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&user_id).map(|u| {
            u.favorite_offer_ids.retain(|id| *id != offer_id);
            u.clone()
        }))
    }
}
