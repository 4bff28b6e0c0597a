use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{NewUser, User};

/// A user as handed to the store: the identifier is unset until first save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
}

impl UserRecord {
    /// A record that has never been persisted.
    pub fn unsaved(data: NewUser) -> Self {
        Self {
            id: None,
            first_name: data.first_name,
            last_name: data.last_name,
            age: data.age,
            email: data.email,
        }
    }
}

impl From<User> for UserRecord {
    fn from(u: User) -> Self {
        Self {
            id: Some(u.id),
            first_name: u.first_name,
            last_name: u.last_name,
            age: u.age,
            email: u.email,
        }
    }
}

/// Faults a store may raise on any operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would break email uniqueness.
    #[error("email '{email}' is already taken")]
    DuplicateEmail { email: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert when `record.id` is `None`, otherwise overwrite the row with that id.
    /// Returns the stored user with its identifier.
    async fn save(&self, record: UserRecord) -> StoreResult<User>;
    /// Load a user by id.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    /// All users, ascending by id.
    async fn find_all(&self) -> StoreResult<Vec<User>>;
    async fn exists_by_id(&self, id: i64) -> StoreResult<bool>;
    /// Delete by id. Deleting a missing id is a no-op.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}
