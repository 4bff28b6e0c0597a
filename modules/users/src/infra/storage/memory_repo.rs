//! In-process store: an ordered map behind a mutex plus an atomic id counter.
//!
//! Ids start at 1 and only grow, so an id freed by a delete is never reused.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::anyhow;
use parking_lot::Mutex;

use crate::contract::User;
use crate::domain::repo::{StoreError, StoreResult, UserRecord, UsersRepository};

pub struct InMemoryUsersRepository {
    users: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUsersRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

fn email_taken(users: &BTreeMap<i64, User>, email: &str, except: Option<i64>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn save(&self, record: UserRecord) -> StoreResult<User> {
        let mut users = self.users.lock();

        if let Some(id) = record.id {
            if !users.contains_key(&id) {
                return Err(StoreError::Backend(anyhow!("no user with id {id} to update")));
            }
        }
        if email_taken(&users, &record.email, record.id) {
            return Err(StoreError::DuplicateEmail {
                email: record.email,
            });
        }

        let id = match record.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let user = User {
            id,
            first_name: record.first_name,
            last_name: record.last_name,
            age: record.age,
            email: record.email,
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.lock().values().cloned().collect())
    }

    async fn exists_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.users.lock().contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        self.users.lock().remove(&id);
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.users.lock().len() as u64)
    }
}
