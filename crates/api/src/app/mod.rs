//! Application wiring: routes, services, DTOs, error mapping.

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{Extension, Router, http::StatusCode, routing::get};
use tower::ServiceBuilder;

use self::services::AppServices;

/// Assemble the router over already-wired services.
///
/// Separated from [`build_app`] so tests can inject in-memory stores and
/// keep handles for seeding.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::availability::router())
        .merge(routes::bookings::router())
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}

/// Wire services from the environment (read once at startup) and build the
/// full application router.
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    router(services)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
