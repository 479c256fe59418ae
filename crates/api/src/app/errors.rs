use core::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agrimarket_core::DomainError;
use agrimarket_infra::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(DomainError::Validation(msg)) => json_error(StatusCode::BAD_REQUEST, msg),
        ServiceError::Domain(DomainError::InvalidId(msg)) => json_error(StatusCode::BAD_REQUEST, msg),
        ServiceError::Domain(e @ DomainError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, e.to_string())
        }
        ServiceError::Domain(DomainError::Conflict(msg)) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "success": false,
                "message": msg,
                "alreadyExists": true,
            })),
        )
            .into_response(),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Malformed or mistyped JSON body.
pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Query string that does not fit the expected parameters.
pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Parse a path id, answering 400 when it is not a valid identifier.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|e: DomainError| service_error_to_response(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimarket_catalog::CropId;
    use agrimarket_infra::document_store::StoreError;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::validation("name must not be empty"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("Invalid crop id"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Crop"), StatusCode::NOT_FOUND),
            (DomainError::conflict("dup"), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err.into()).status(), status);
        }
    }

    #[test]
    fn store_errors_are_server_errors() {
        let res = service_error_to_response(StoreError::Backend("connection refused".into()).into());
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_id_is_bad_request() {
        let res = parse_id::<CropId>("not-an-id").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
