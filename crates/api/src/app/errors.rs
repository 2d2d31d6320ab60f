use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stayforge_infra::BookingError;

pub fn booking_error_to_response(err: BookingError) -> axum::response::Response {
    match err {
        BookingError::InvalidRequest(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
        }
        BookingError::NotConfigured(date) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "not_configured",
            format!("no inventory configured for {date}"),
        ),
        BookingError::CapacityUnavailable(date) => json_error(
            StatusCode::CONFLICT,
            "capacity_unavailable",
            format!("capacity unavailable on {date}"),
        ),
        BookingError::Catalog(msg) => json_error(StatusCode::BAD_GATEWAY, "catalog_unavailable", msg),
        BookingError::PersistenceFailed(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_failed", msg)
        }
        BookingError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
