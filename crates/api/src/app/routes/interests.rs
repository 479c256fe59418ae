use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use agrimarket_catalog::CropId;
use agrimarket_interests::{InterestId, NewInterest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(submit_interest))
        .route("/user/:email", get(list_by_user))
        .route("/crop/:crop_id", get(list_by_crop))
        .route("/:id", put(update_status).delete(delete_interest))
}

pub async fn submit_interest(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewInterest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.interests.submit(body).await {
        Ok(interest) => {
            Json(dto::result_to_json("Interest added successfully", interest)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(email): Path<String>,
) -> axum::response::Response {
    match services.interests.list_by_buyer(&email).await {
        Ok(interests) => Json(dto::data_to_json(interests)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_crop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(crop_id): Path<String>,
) -> axum::response::Response {
    let crop_id: CropId = match errors::parse_id(&crop_id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.interests.list_by_crop(crop_id).await {
        Ok(interests) => Json(dto::data_to_json(interests)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::SetStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: InterestId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.interests.update_status(id, body.status).await {
        Ok(interest) => {
            Json(dto::result_to_json("Interest updated successfully", interest)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_interest(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InterestId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.interests.delete(id).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Interest deleted successfully",
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
