//! Infrastructure layer: the document store behind users and cards.

pub mod store;

pub use store::{InMemoryStore, Store, StoreConfig, StoreError, StoreResult, connect_store};
#[cfg(feature = "postgres")]
pub use store::PostgresStore;
