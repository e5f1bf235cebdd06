use std::sync::Arc;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    services::database::{CredentialStore, DatabaseLayer, MemoryStore},
    utils::schemas,
};

pub async fn setup_database(config: &DatabaseConfig) -> surrealdb::Result<Arc<dyn CredentialStore>> {
    match config.backend {
        StoreBackend::Surreal => {
            let database_layer = DatabaseLayer::new(config).await?;
            database_layer.initialize_schemas(schemas::all()).await?;

            Ok(Arc::new(database_layer))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; nothing will survive a restart");

            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
