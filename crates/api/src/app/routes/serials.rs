use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use assettrack_core::SerialNumber;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_serials))
        .route("/:serial", delete(delete_serial))
        .route("/:serial/history", get(get_history))
        .route("/:serial/status", get(get_status))
        .route("/:serial/event", post(append_event))
}

fn parse_serial(raw: &str) -> Result<SerialNumber, Response> {
    SerialNumber::parse(raw).map_err(|e| errors::store_error_to_response(e.into()))
}

pub async fn list_serials(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.projector().catalog().await {
        Ok(serials) => (StatusCode::OK, Json(dto::CatalogResponse { serials })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> Response {
    let serial = match parse_serial(&serial) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.projector().full_view(&serial).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> Response {
    let serial = match parse_serial(&serial) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.projector().current_state(&serial).await {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn append_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
    body: Result<Json<dto::AppendEventRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text());
        }
    };

    match services.store().append_draft(body.into_draft(serial)).await {
        Ok(event) => (
            StatusCode::CREATED,
            Json(dto::AppendEventResponse {
                event_id: event.event_id.get(),
            }),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_serial(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> Response {
    let serial = match parse_serial(&serial) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.store().delete_all(&serial).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(dto::DeleteSerialResponse {
                message: format!("deleted all events for serial {serial}"),
                deleted,
            }),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
