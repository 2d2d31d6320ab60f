use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stayforge_booking::BookingReference;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/:reference", get(get_booking))
}

pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateBookingRequest>,
) -> axum::response::Response {
    let request = match body.into_domain() {
        Ok(v) => v,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
    };

    match services.allocator().create_booking(request).await {
        Ok(booking) => (StatusCode::CREATED, Json(dto::booking_to_json(booking))).into_response(),
        Err(e) => errors::booking_error_to_response(e),
    }
}

pub async fn get_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Path(reference): Path<String>,
) -> axum::response::Response {
    let reference = match BookingReference::parse(&reference) {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid booking reference");
        }
    };

    match services.bookings().get(&reference).await {
        Ok(Some(booking)) => (StatusCode::OK, Json(dto::booking_to_json(booking))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found"),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}
