use std::sync::Arc;

use agrimarket_infra::config::StoreBackend;
use agrimarket_infra::document_store::{
    DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, StoreResult,
};
use agrimarket_infra::services::{CatalogService, InterestService};

/// The one store every service shares.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Services handed to every handler through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService<SharedStore>,
    pub interests: InterestService<SharedStore>,
    store: SharedStore,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            interests: InterestService::new(store.clone()),
            store,
        }
    }

    /// Process-local store; data is lost on restart.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }

    pub async fn from_config(backend: &StoreBackend) -> StoreResult<Self> {
        match backend {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory document store");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let store = PostgresDocumentStore::connect(database_url, *max_connections).await?;
                tracing::info!(max_connections, "using postgres document store");
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    /// Release the store. Call once the server has stopped taking requests.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
