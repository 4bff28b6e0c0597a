use async_trait::async_trait;

use crate::contract::{
    error::UsersError,
    model::{NewUser, User},
};

/// Public API trait for the users module that other modules can use
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Create a new user; the store assigns the identifier
    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersError>;

    /// Get a user by ID, `None` when absent
    async fn get_user(&self, id: i64) -> Result<Option<User>, UsersError>;

    /// List every stored user
    async fn get_all_users(&self) -> Result<Vec<User>, UsersError>;

    /// Overwrite all fields of an existing user, `None` when absent
    async fn update_user(&self, id: i64, data: NewUser) -> Result<Option<User>, UsersError>;

    /// Delete a user by ID; `false` when there was nothing to delete
    async fn delete_user(&self, id: i64) -> Result<bool, UsersError>;
}
