//! The SeaORM store against a migrated in-memory SQLite database.

mod common;

use anyhow::Result;
use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::MigratorTrait;

use common::{migrated_sqlite, new_user, sqlite_memory};
use users::domain::repo::{StoreError, UserRecord, UsersRepository};
use users::infra::storage::migrations::Migrator;
use users::infra::storage::SeaOrmUsersRepository;

#[tokio::test]
async fn migrations_are_idempotent_and_reversible() -> Result<()> {
    let db = sqlite_memory().await;
    Migrator::up(&db, None).await?;
    // already applied; nothing left to do
    Migrator::up(&db, None).await?;

    let repo = SeaOrmUsersRepository::new(db.clone());
    assert_eq!(repo.count().await?, 0);

    Migrator::down(&db, None).await?;
    let res = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) FROM users",
        ))
        .await;
    assert!(res.is_err(), "table should be gone after down");
    Ok(())
}

#[tokio::test]
async fn save_inserts_then_updates_in_place() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(migrated_sqlite().await);

    let john = repo
        .save(UserRecord::unsaved(new_user("John", "john@example.com")))
        .await?;
    assert_eq!(john.id, 1);
    assert!(repo.exists_by_id(1).await?);

    let mut rec = UserRecord::from(john.clone());
    rec.age = 45;
    let updated = repo.save(rec).await?;
    assert_eq!(updated.id, john.id);
    assert_eq!(updated.age, 45);
    assert_eq!(repo.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn unique_index_reports_duplicate_email() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(migrated_sqlite().await);
    repo.save(UserRecord::unsaved(new_user("John", "john@example.com")))
        .await?;

    let err = repo
        .save(UserRecord::unsaved(new_user("Jane", "john@example.com")))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::DuplicateEmail { ref email } if email == "john@example.com"),
        "unexpected error: {err:?}"
    );
    assert_eq!(repo.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn autoincrement_never_reuses_deleted_ids() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(migrated_sqlite().await);
    for i in 1..=3 {
        repo.save(UserRecord::unsaved(new_user("U", &format!("u{i}@example.com"))))
            .await?;
    }

    // freeing the highest id is the case plain ROWID tables get wrong
    repo.delete_by_id(3).await?;
    assert!(!repo.exists_by_id(3).await?);

    let next = repo
        .save(UserRecord::unsaved(new_user("V", "v@example.com")))
        .await?;
    assert_eq!(next.id, 4);

    let ids: Vec<i64> = repo.find_all().await?.into_iter().map(|u| u.id).collect();
    assert_eq!(ids, [1, 2, 4]);
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_row_is_not_an_error() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(migrated_sqlite().await);
    repo.delete_by_id(42).await?;
    assert!(repo.find_by_id(42).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn missing_table_surfaces_as_backend_fault() -> Result<()> {
    // no migrations
    let repo = SeaOrmUsersRepository::new(sqlite_memory().await);
    let err = repo.find_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    Ok(())
}
