use sea_orm::{ActiveValue, Set};

use crate::contract::model::User;
use crate::domain::repo::UserRecord;
use crate::infra::storage::entity::{ActiveModel, Model};

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            age: m.age,
            email: m.email,
        }
    }
}

/// Every column is `Set`; the id is left `NotSet` for a fresh record so the
/// database assigns it.
impl From<UserRecord> for ActiveModel {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id.map_or(ActiveValue::NotSet, Set),
            first_name: Set(r.first_name),
            last_name: Set(r.last_name),
            age: Set(r.age),
            email: Set(r.email),
        }
    }
}
