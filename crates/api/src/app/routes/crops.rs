use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use serde_json::json;

use agrimarket_catalog::{CropId, CropPatch, CropReplacement, NewCrop};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_crops).post(create_crop))
        .route("/category/:category", get(list_by_category))
        .route("/owner/:email", get(list_by_owner))
        .route(
            "/:id",
            get(get_crop)
                .patch(update_crop)
                .put(replace_crop)
                .delete(delete_crop),
        )
        .route("/:id/quantity", patch(set_quantity))
}

pub async fn create_crop(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewCrop>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.catalog.create(body).await {
        Ok(id) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Crop added successfully",
                "result": { "insertedId": id.to_string() },
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_crops(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::ListCropsParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    match services
        .catalog
        .list(&params.query(), params.page_request())
        .await
    {
        Ok(page) => Json(dto::crops_page_to_json(page)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn latest_crops(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.latest().await {
        Ok(crops) => Json(dto::data_to_json(crops)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.categories().await {
        Ok(values) => Json(dto::data_to_json(values)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn locations(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.locations().await {
        Ok(values) => Json(dto::data_to_json(values)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_crop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CropId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.get_with_context(id).await {
        Ok(view) => Json(dto::crop_view_to_json(view)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
    params: Result<Query<dto::PageParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    match services
        .catalog
        .list_by_category(&category, params.page_request())
        .await
    {
        Ok(page) => {
            let mut body = dto::crops_page_to_json(page);
            body["category"] = json!(category);
            Json(body).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_owner(
    Extension(services): Extension<Arc<AppServices>>,
    Path(email): Path<String>,
) -> axum::response::Response {
    match services.catalog.list_by_owner(&email).await {
        Ok(crops) => Json(dto::data_to_json(crops)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_crop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CropPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: CropId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.catalog.update(id, patch).await {
        Ok(crop) => Json(dto::result_to_json("Crop updated successfully", crop)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn replace_crop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CropReplacement>, JsonRejection>,
) -> axum::response::Response {
    let id: CropId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let Json(replacement) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.catalog.replace(id, replacement).await {
        Ok(crop) => Json(dto::result_to_json("Crop updated successfully", crop)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::SetQuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: CropId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.catalog.set_quantity(id, body.quantity).await {
        Ok(crop) => Json(dto::result_to_json("Quantity updated successfully", crop)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_crop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CropId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.delete(id).await {
        Ok(cascaded) => Json(json!({
            "success": true,
            "message": "Crop deleted successfully",
            "deletedInterests": cascaded,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
