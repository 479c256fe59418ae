//! Catalog domain module.
//!
//! Crop listings, their input schemas and the rules for filtering them,
//! implemented as deterministic domain logic (no IO, no HTTP, no storage).

pub mod crop;
pub mod query;

pub use crop::{
    CROPS_COLLECTION, Crop, CropDetails, CropId, CropPatch, CropReplacement, CropStatus, NewCrop,
    Owner,
};
pub use query::{CropQuery, LATEST_LIMIT, RELATED_LIMIT};
