use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use agrimarket_catalog::{Crop, CropQuery};
use agrimarket_core::PageRequest;
use agrimarket_infra::services::{CropView, Page};
use agrimarket_interests::InterestStatus;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /crops` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListCropsParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListCropsParams {
    pub fn query(&self) -> CropQuery {
        CropQuery {
            search: self.search.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: InterestStatus,
}

/// Zero and negative values are clamped to 1 by `PageRequest`.
fn page_request(page: Option<i64>, limit: Option<i64>) -> PageRequest {
    let non_negative = |v: i64| u64::try_from(v).unwrap_or(0);
    PageRequest::new(page.map(non_negative), limit.map(non_negative))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn crops_page_to_json(page: Page<Crop>) -> JsonValue {
    json!({
        "success": true,
        "data": page.items,
        "pagination": page.info,
    })
}

pub fn crop_view_to_json(view: CropView) -> JsonValue {
    json!({
        "success": true,
        "result": view.crop,
        "relatedProducts": view.related,
        "interests": view.interests,
    })
}

pub fn data_to_json(data: impl serde::Serialize) -> JsonValue {
    json!({
        "success": true,
        "data": data,
    })
}

pub fn result_to_json(message: &str, result: impl serde::Serialize) -> JsonValue {
    json!({
        "success": true,
        "message": message,
        "result": result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_and_clamp() {
        let req = PageParams::default().page_request();
        assert_eq!((req.page(), req.limit()), (1, 10));

        let req = PageParams {
            page: Some(-3),
            limit: Some(0),
        }
        .page_request();
        assert_eq!((req.page(), req.limit()), (1, 1));
    }

    #[test]
    fn list_params_carry_filters() {
        let params: ListCropsParams = serde_json::from_value(json!({
            "search": "wheat",
            "location": "Bogura",
            "page": 2
        }))
        .unwrap();
        let query = params.query();
        assert_eq!(query.search.as_deref(), Some("wheat"));
        assert_eq!(query.location.as_deref(), Some("Bogura"));
        assert_eq!(params.page_request().skip(), 10);
    }
}
