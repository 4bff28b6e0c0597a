use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::contract::client::UsersApi;
use crate::domain::repo::UsersRepository;
use crate::domain::service::Service;
use crate::gateways::local::UsersLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{InMemoryUsersRepository, SeaOrmUsersRepository};

/// Where user records live.
pub enum StorageBackend {
    /// Process-local map; contents are lost on exit.
    Memory,
    /// SQL table reached through SeaORM. Migrations run on init.
    Database(DatabaseConnection),
}

/// Users module: owns the domain service and wires it to REST and the local client.
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
}

impl UsersModule {
    pub async fn init(backend: StorageBackend) -> anyhow::Result<Self> {
        info!("Initializing users module");

        let repo: Arc<dyn UsersRepository> = match backend {
            StorageBackend::Memory => {
                info!("Using in-memory user store");
                Arc::new(InMemoryUsersRepository::new())
            }
            StorageBackend::Database(conn) => {
                info!("Running users database migrations");
                Migrator::up(&conn, None).await?;
                info!("Users database migrations completed successfully");
                Arc::new(SeaOrmUsersRepository::new(conn))
            }
        };

        Ok(Self {
            service: Arc::new(Service::new(repo)),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn UsersApi> {
        Arc::new(UsersLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
