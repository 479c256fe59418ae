//! Infrastructure layer: document stores, the marketplace services built on
//! them, and process configuration.

pub mod config;
pub mod document_store;
pub mod services;
