//! Application services: the marketplace operations, written against the
//! [`DocumentStore`](crate::document_store::DocumentStore) boundary.
//!
//! - `catalog`: crop listings (create, search, facets, edits, cascade delete)
//! - `interests`: buyer interests and the acceptance side effect on inventory

use thiserror::Error;

use agrimarket_core::{DomainError, PageInfo};

use crate::document_store::StoreError;

pub mod catalog;
pub mod interests;

pub use catalog::{CatalogService, CropView};
pub use interests::InterestService;

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic business failure (validation, not found, duplicate).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One page of results plus its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}
