#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use users::infra::storage::migrations::Migrator;
use users::model::NewUser;
use users::{StorageBackend, UsersModule};

/// Which store a test runs against.
#[derive(Debug, Clone, Copy)]
pub enum Store {
    Memory,
    Sqlite,
}

pub const ALL_STORES: [Store; 2] = [Store::Memory, Store::Sqlite];

/// Fresh in-memory SQLite database. A single pooled connection keeps it alive.
pub async fn sqlite_memory() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("Failed to connect to test database")
}

/// Same as [`sqlite_memory`] with the users table already created.
pub async fn migrated_sqlite() -> DatabaseConnection {
    let db = sqlite_memory().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn users_module(store: Store) -> UsersModule {
    let backend = match store {
        Store::Memory => StorageBackend::Memory,
        Store::Sqlite => StorageBackend::Database(sqlite_memory().await),
    };
    UsersModule::init(backend)
        .await
        .expect("Failed to init users module")
}

pub fn new_user(first_name: &str, email: &str) -> NewUser {
    NewUser {
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        age: 30,
        email: email.to_string(),
    }
}
