//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.
//! Email uniqueness is left to the table's unique index; a violation is
//! reported as [`StoreError::DuplicateEmail`].

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, SqlErr,
};

use crate::contract::User;
use crate::domain::repo::{StoreError, StoreResult, UserRecord, UsersRepository};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Split a write failure into a uniqueness rejection or a plain backend fault.
fn write_error(e: DbErr, email: String, what: &'static str) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        return StoreError::DuplicateEmail { email };
    }
    StoreError::Backend(anyhow::Error::new(e).context(what))
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn save(&self, record: UserRecord) -> StoreResult<User> {
        let email = record.email.clone();
        let is_new = record.id.is_none();
        let am = UserAM::from(record);

        let saved = if is_new {
            am.insert(&self.conn)
                .await
                .map_err(|e| write_error(e, email, "insert failed"))?
        } else {
            am.update(&self.conn)
                .await
                .map_err(|e| write_error(e, email, "update failed"))?
        };
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn exists_by_id(&self, id: i64) -> StoreResult<bool> {
        let count = UserEntity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("exists_by_id failed")?;
        Ok(count > 0)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_by_id failed")?;
        tracing::debug!(id, rows_affected = res.rows_affected, "delete_by_id");
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        let count = UserEntity::find()
            .count(&self.conn)
            .await
            .context("count failed")?;
        Ok(count)
    }
}
