use axum::{Router, routing::get};

pub mod crops;
pub mod interests;
pub mod system;

/// Router for the marketplace endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/latest-crops", get(crops::latest_crops))
        .route("/categories", get(crops::categories))
        .route("/locations", get(crops::locations))
        .nest("/crops", crops::router())
        .nest("/interests", interests::router())
}
