//! Document store boundary for users and cards.
//!
//! The HTTP layer only sees `Arc<dyn Store>`; which backend sits behind it is a deployment
//! decision made once at startup via [`connect_store`].

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use r#trait::{Store, StoreError, StoreResult};

/// Which backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    #[default]
    Memory,
    Postgres { url: String },
}

/// Open the configured backend.
pub async fn connect_store(config: &StoreConfig) -> StoreResult<Arc<dyn Store>> {
    match config {
        StoreConfig::Memory => {
            tracing::info!(backend = "memory", "store ready");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "postgres")]
        StoreConfig::Postgres { url } => {
            let store = PostgresStore::connect(url).await?;
            tracing::info!(backend = "postgres", "store ready");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StoreConfig::Postgres { .. } => Err(StoreError::backend(anyhow::anyhow!(
            "postgres store requested but this build lacks the `postgres` feature"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_starts_empty() {
        let store = connect_store(&StoreConfig::Memory).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_cards().await.unwrap().is_empty());
        store.close().await;
    }
}
