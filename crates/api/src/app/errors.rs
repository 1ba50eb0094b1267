use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use assettrack_core::DomainError;
use assettrack_infra::EventStoreError;

pub fn store_error_to_response(err: EventStoreError) -> Response {
    let status = match &err {
        EventStoreError::Domain(DomainError::Validation(_) | DomainError::Ordering { .. }) => {
            StatusCode::BAD_REQUEST
        }
        EventStoreError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        EventStoreError::Domain(DomainError::Consistency(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        EventStoreError::Storage(detail) => {
            // Backend details stay in the log.
            error!(detail = %detail, "storage failure");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.code(),
                "storage failure",
            );
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
