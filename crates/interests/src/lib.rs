//! Interest domain module.
//!
//! Buyer interests in crop listings and the rules of their status lifecycle,
//! implemented as deterministic domain logic (no IO, no HTTP, no storage).

pub mod interest;

pub use interest::{
    INTERESTS_COLLECTION, Interest, InterestDetails, InterestId, InterestStatus, InterestWithCrop,
    NewInterest, StatusChange,
};
