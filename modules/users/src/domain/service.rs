use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::repo::{UserRecord, UsersRepository};

/// Domain service for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    /// Create a service over the given store.
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "users.service.create_user",
        skip(self),
        fields(email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let user = self.repo.save(UserRecord::unsaved(new_user)).await?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        debug!("Getting user by id");
        Ok(self.repo.find_by_id(id).await?)
    }

    #[instrument(name = "users.service.get_all_users", skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.repo.find_all().await?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    /// Overwrite all four fields of an existing user.
    ///
    /// Read-then-write: two store calls, not atomic.
    #[instrument(name = "users.service.update_user", skip(self, data), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, data: NewUser) -> Result<Option<User>, DomainError> {
        info!("Updating user");

        let Some(mut current) = self.repo.find_by_id(id).await? else {
            debug!("User not found, nothing to update");
            return Ok(None);
        };

        current.overwrite(data);
        let updated = self.repo.save(current.into()).await?;

        info!("Successfully updated user");
        Ok(Some(updated))
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        info!("Deleting user");

        if !self.repo.exists_by_id(id).await? {
            debug!("User not found, nothing to delete");
            return Ok(false);
        }
        self.repo.delete_by_id(id).await?;

        info!("Successfully deleted user");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repo::{StoreError, StoreResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Scripted store that records the calls it receives.
    #[derive(Default)]
    struct ScriptedRepo {
        calls: Mutex<Vec<String>>,
        existing: Option<User>,
        reject_email: bool,
    }

    impl ScriptedRepo {
        fn with_user(user: User) -> Self {
            Self {
                existing: Some(user),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().push(call);
        }
    }

    #[async_trait]
    impl UsersRepository for ScriptedRepo {
        async fn save(&self, record: UserRecord) -> StoreResult<User> {
            self.record(format!("save({:?})", record.id));
            if self.reject_email {
                return Err(StoreError::DuplicateEmail {
                    email: record.email,
                });
            }
            Ok(User {
                id: record.id.unwrap_or(1),
                first_name: record.first_name,
                last_name: record.last_name,
                age: record.age,
                email: record.email,
            })
        }

        async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
            self.record(format!("find_by_id({id})"));
            Ok(self.existing.clone().filter(|u| u.id == id))
        }

        async fn find_all(&self) -> StoreResult<Vec<User>> {
            self.record("find_all".to_string());
            Ok(self.existing.clone().into_iter().collect())
        }

        async fn exists_by_id(&self, id: i64) -> StoreResult<bool> {
            self.record(format!("exists_by_id({id})"));
            Ok(self.existing.as_ref().is_some_and(|u| u.id == id))
        }

        async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
            self.record(format!("delete_by_id({id})"));
            Ok(())
        }

        async fn count(&self) -> StoreResult<u64> {
            self.record("count".to_string());
            Ok(u64::from(self.existing.is_some()))
        }
    }

    fn john() -> User {
        User {
            id: 1,
            first_name: "John".into(),
            last_name: "Doe".into(),
            age: 30,
            email: "john@example.com".into(),
        }
    }

    fn jane_data() -> NewUser {
        NewUser {
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            age: 25,
            email: "jane@example.com".into(),
        }
    }

    #[tokio::test]
    async fn create_saves_exactly_once_without_id() {
        let repo = Arc::new(ScriptedRepo::default());
        let svc = Service::new(repo.clone());

        let user = svc.create_user(jane_data()).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.first_name, "Jane");
        assert_eq!(repo.calls(), vec!["save(None)"]);
    }

    #[tokio::test]
    async fn create_accepts_values_without_validation() {
        let repo = Arc::new(ScriptedRepo::default());
        let svc = Service::new(repo);

        let user = svc
            .create_user(NewUser {
                first_name: String::new(),
                last_name: String::new(),
                age: -5,
                email: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(user.age, -5);
        assert!(user.email.is_empty());
    }

    #[tokio::test]
    async fn get_only_looks_up_by_id() {
        let repo = Arc::new(ScriptedRepo::default());
        let svc = Service::new(repo.clone());

        assert!(svc.get_user(42).await.unwrap().is_none());
        assert_eq!(repo.calls(), vec!["find_by_id(42)"]);
    }

    #[tokio::test]
    async fn update_reads_then_overwrites_all_fields() {
        let repo = Arc::new(ScriptedRepo::with_user(john()));
        let svc = Service::new(repo.clone());

        let updated = svc.update_user(1, jane_data()).await.unwrap().unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.last_name, "Smith");
        assert_eq!(updated.age, 25);
        assert_eq!(updated.email, "jane@example.com");
        assert_eq!(repo.calls(), vec!["find_by_id(1)", "save(Some(1))"]);
    }

    #[tokio::test]
    async fn update_of_missing_user_never_saves() {
        let repo = Arc::new(ScriptedRepo::default());
        let svc = Service::new(repo.clone());

        assert!(svc.update_user(999, jane_data()).await.unwrap().is_none());
        assert_eq!(repo.calls(), vec!["find_by_id(999)"]);
    }

    #[tokio::test]
    async fn delete_checks_existence_first() {
        let repo = Arc::new(ScriptedRepo::with_user(john()));
        let svc = Service::new(repo.clone());

        assert!(svc.delete_user(1).await.unwrap());
        assert_eq!(repo.calls(), vec!["exists_by_id(1)", "delete_by_id(1)"]);
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_false_and_touches_nothing() {
        let repo = Arc::new(ScriptedRepo::default());
        let svc = Service::new(repo.clone());

        assert!(!svc.delete_user(999).await.unwrap());
        assert_eq!(repo.calls(), vec!["exists_by_id(999)"]);
    }

    #[tokio::test]
    async fn duplicate_email_propagates_from_store() {
        let repo = Arc::new(ScriptedRepo {
            reject_email: true,
            ..Default::default()
        });
        let svc = Service::new(repo);

        let err = svc.create_user(jane_data()).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::EmailAlreadyExists { ref email } if email == "jane@example.com"
        ));
    }
}
