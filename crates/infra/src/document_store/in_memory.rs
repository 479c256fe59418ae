//! In-memory document store for tests/dev.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use agrimarket_core::{Condition, DocumentId, Filter, FindOptions, SortKey, SortOrder};

use super::r#trait::{Document, DocumentStore, ID_FIELD, StoreError, StoreResult};

type Collections = HashMap<String, BTreeMap<DocumentId, Document>>;

/// In-memory store. Each operation holds the lock for its whole duration, so
/// single-document operations are atomic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, mut body: Document) -> StoreResult<DocumentId> {
        body.remove(ID_FIELD);
        let id = DocumentId::new();
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(id, body);
        Ok(id)
    }

    async fn find(&self, collection: &str, options: &FindOptions) -> StoreResult<Vec<Document>> {
        let map = self.read()?;
        let Some(docs) = map.get(collection) else {
            return Ok(vec![]);
        };

        // BTreeMap iteration is ascending id order.
        let mut rows: Vec<(&DocumentId, &Document)> = docs
            .iter()
            .filter(|(id, body)| matches(**id, body, &options.filter))
            .collect();

        if let Some(sort) = &options.sort {
            if let SortKey::Field(field) = &sort.key {
                rows.sort_by(|a, b| compare_json(lookup(a.1, field), lookup(b.1, field)));
            }
            if sort.order == SortOrder::Desc {
                rows.reverse();
            }
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let take = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(rows
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(id, body)| with_id(*id, body))
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let map = self.read()?;
        let count = map
            .get(collection)
            .map(|docs| docs.iter().filter(|(id, body)| matches(**id, body, filter)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update_by_id(&self, collection: &str, id: DocumentId, mut set: Document) -> StoreResult<bool> {
        set.remove(ID_FIELD);
        let mut map = self.write()?;
        let Some(body) = map.get_mut(collection).and_then(|docs| docs.get_mut(&id)) else {
            return Ok(false);
        };
        for (key, value) in set {
            body.insert(key, value);
        }
        Ok(true)
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        let mut map = self.write()?;
        Ok(map
            .get_mut(collection)
            .and_then(|docs| docs.remove(&id))
            .is_some())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut map = self.write()?;
        let Some(docs) = map.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|id, body| !matches(*id, body, filter));
        Ok((before - docs.len()) as u64)
    }

    async fn distinct(&self, collection: &str, field: &str) -> StoreResult<Vec<String>> {
        let map = self.read()?;
        let values: BTreeSet<String> = map
            .get(collection)
            .into_iter()
            .flat_map(|docs| docs.values())
            .filter_map(|body| match lookup(body, field)? {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
                other => Some(other.to_string()),
            })
            .collect();
        Ok(values.into_iter().collect())
    }
}

fn with_id(id: DocumentId, body: &Document) -> Document {
    let mut doc = body.clone();
    doc.insert(ID_FIELD.to_string(), JsonValue::String(id.to_string()));
    doc
}

fn matches(id: DocumentId, body: &Document, filter: &Filter) -> bool {
    filter.conditions().iter().all(|condition| match condition {
        Condition::Eq { field, value } => lookup(body, field) == Some(value),
        Condition::ContainsAnyIgnoreCase { fields, needle } => {
            let needle = needle.to_lowercase();
            fields.iter().any(|field| {
                matches!(lookup(body, field), Some(JsonValue::String(s)) if s.to_lowercase().contains(&needle))
            })
        }
        Condition::IdEq(other) => id == *other,
        Condition::IdNe(other) => id != *other,
    })
}

/// Resolve a dotted path inside a document.
fn lookup<'a>(body: &'a Document, field: &str) -> Option<&'a JsonValue> {
    let mut segments = field.split('.');
    let mut current = body.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    fn rank(v: Option<&JsonValue>) -> u8 {
        match v {
            None => 0,
            Some(JsonValue::Null) => 1,
            Some(JsonValue::Bool(_)) => 2,
            Some(JsonValue::Number(_)) => 3,
            Some(JsonValue::String(_)) => 4,
            Some(JsonValue::Array(_)) => 5,
            Some(JsonValue::Object(_)) => 6,
        }
    }

    match (a, b) {
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
