use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersApi,
    error::UsersError,
    model::{NewUser, User},
};
use crate::domain::service::Service;

/// Local implementation of the UsersApi trait that delegates to the domain service
pub struct UsersLocalClient {
    service: Arc<Service>,
}

impl UsersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersApi for UsersLocalClient {
    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, UsersError> {
        self.service.get_user(id).await.map_err(Into::into)
    }

    async fn get_all_users(&self) -> Result<Vec<User>, UsersError> {
        self.service.get_all_users().await.map_err(Into::into)
    }

    async fn update_user(&self, id: i64, data: NewUser) -> Result<Option<User>, UsersError> {
        self.service.update_user(id, data).await.map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, UsersError> {
        self.service.delete_user(id).await.map_err(Into::into)
    }
}
