//! `agrimarket-core`: building blocks shared by the marketplace crates.
//!
//! This crate contains **pure** primitives (no IO, no storage, no HTTP):
//! identifiers, the domain error model, the store-agnostic query description
//! and pagination math.

pub mod error;
pub mod id;
pub mod pagination;
pub mod query;

pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
pub use pagination::{PageInfo, PageRequest};
pub use query::{Condition, Filter, FindOptions, Sort, SortKey, SortOrder};
