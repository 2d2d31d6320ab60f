use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stayforge_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/products/:id/availability", get(get_availability))
}

pub async fn get_availability(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(params): Query<dto::AvailabilityParams>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };
    let from = match dto::parse_date(&params.from, "from") {
        Ok(v) => v,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
    };
    let to = match dto::parse_date(&params.to, "to") {
        Ok(v) => v,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
    };

    match services.availability().availability(product_id, from, to).await {
        Ok(calendar) => (StatusCode::OK, Json(dto::availability_to_json(calendar))).into_response(),
        Err(e) => errors::booking_error_to_response(e),
    }
}
