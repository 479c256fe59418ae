//! Store-agnostic query description.
//!
//! Services describe *what* they want (conditions, ordering, window) and each
//! `DocumentStore` implementation decides how to evaluate it. Field names are
//! JSON paths in dotted form (`owner.ownerEmail`).

use serde_json::Value as JsonValue;

use crate::id::DocumentId;

/// A single predicate over a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field at `field` equals `value` exactly.
    Eq { field: String, value: JsonValue },
    /// At least one of `fields` is a string containing `needle`, ignoring case.
    /// The needle is a literal, not a pattern.
    ContainsAnyIgnoreCase { fields: Vec<String>, needle: String },
    /// The document id equals the given id.
    IdEq(DocumentId),
    /// The document id differs from the given id.
    IdNe(DocumentId),
}

/// Conjunction of conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self::all().and(Condition::IdEq(id))
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.and(Condition::Eq {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn contains_any_ignore_case<I, F>(self, fields: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.and(Condition::ContainsAnyIgnoreCase {
            fields: fields.into_iter().map(Into::into).collect(),
            needle: needle.into(),
        })
    }

    pub fn exclude_id(self, id: DocumentId) -> Self {
        self.and(Condition::IdNe(id))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// What to order by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Store-assigned id (creation order).
    Id,
    /// A document field, by JSON path.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    /// Most recently created first.
    pub fn newest_first() -> Self {
        Self {
            key: SortKey::Id,
            order: SortOrder::Desc,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            key: SortKey::Field(field.into()),
            order: SortOrder::Desc,
        }
    }
}

/// Filter + ordering + window for a `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Split a dotted JSON path into its segments.
pub fn path_segments(field: &str) -> Vec<String> {
    field.split('.').map(str::to_owned).collect()
}
