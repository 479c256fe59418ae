//! Document store boundary.
//!
//! Records are schemaless JSON objects grouped in named collections and keyed
//! by a store-assigned [`DocumentId`](agrimarket_core::DocumentId). Services
//! depend on the [`DocumentStore`] trait only; the backend is picked at
//! start-up.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{Document, DocumentStore, ID_FIELD, StoreError, StoreResult, decode, encode};
