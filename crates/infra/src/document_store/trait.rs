use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use agrimarket_core::{DocumentId, Filter, FindOptions};

/// A stored record: a JSON object. Documents returned by a store always carry
/// their id as a string under [`ID_FIELD`].
pub type Document = Map<String, JsonValue>;

/// Key under which a document exposes its id.
pub const ID_FIELD: &str = "_id";

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store operation error.
///
/// These are **infrastructure errors**. Their text is surfaced to API callers
/// verbatim, so backends put the driver message in it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed (connection, SQL, poisoned lock, ...).
    #[error("{0}")]
    Backend(String),

    /// A stored document could not be decoded into the expected record type.
    #[error("malformed document in '{collection}': {message}")]
    Malformed {
        collection: String,
        message: String,
    },

    /// A record could not be encoded as a JSON object.
    #[error("cannot encode record for '{collection}': {message}")]
    Encode {
        collection: String,
        message: String,
    },
}

/// Minimal document store: create / find / count / update / delete / distinct.
///
/// Every method is a single round trip and atomic per document. Nothing spans
/// two documents; callers that read one record and write another get no
/// isolation between the two steps.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `body` into `collection`; the store assigns and returns the id.
    /// Any `_id` key in `body` is ignored.
    async fn insert(&self, collection: &str, body: Document) -> StoreResult<DocumentId>;

    /// Documents matching `options.filter`, ordered and windowed.
    async fn find(&self, collection: &str, options: &FindOptions) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Merge the top-level keys of `set` into the document. Returns `false`
    /// when no document has that id. The id itself is never changed.
    async fn update_by_id(&self, collection: &str, id: DocumentId, set: Document) -> StoreResult<bool>;

    /// Returns `false` when no document has that id.
    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool>;

    /// Returns the number of deleted documents.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Sorted, de-duplicated string values found at `field`.
    async fn distinct(&self, collection: &str, field: &str) -> StoreResult<Vec<String>>;

    /// Release backend resources. The store must not be used afterwards.
    async fn close(&self) {}

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let options = FindOptions::new(filter.clone()).limit(1);
        Ok(self.find(collection, &options).await?.into_iter().next())
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        self.find_one(collection, &Filter::by_id(id)).await
    }
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert(&self, collection: &str, body: Document) -> StoreResult<DocumentId> {
        (**self).insert(collection, body).await
    }

    async fn find(&self, collection: &str, options: &FindOptions) -> StoreResult<Vec<Document>> {
        (**self).find(collection, options).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        (**self).count(collection, filter).await
    }

    async fn update_by_id(&self, collection: &str, id: DocumentId, set: Document) -> StoreResult<bool> {
        (**self).update_by_id(collection, id, set).await
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        (**self).delete_by_id(collection, id).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        (**self).delete_many(collection, filter).await
    }

    async fn distinct(&self, collection: &str, field: &str) -> StoreResult<Vec<String>> {
        (**self).distinct(collection, field).await
    }

    async fn close(&self) {
        (**self).close().await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        (**self).find_by_id(collection, id).await
    }
}

/// Serialize a record into a document body (without its id).
pub fn encode<T: Serialize>(collection: &str, record: &T) -> StoreResult<Document> {
    match serde_json::to_value(record) {
        Ok(JsonValue::Object(mut map)) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        Ok(other) => Err(StoreError::Encode {
            collection: collection.to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(StoreError::Encode {
            collection: collection.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Deserialize a stored document into a record.
pub fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> StoreResult<T> {
    serde_json::from_value(JsonValue::Object(document)).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        message: e.to_string(),
    })
}
