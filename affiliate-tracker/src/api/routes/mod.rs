//! API route modules.
//!
//! Organizes routes by resource type. Every resource module exposes a public
//! `router()` and a `protected_router()` whose routes sit behind the JWT gate.

pub mod affiliate_links;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod platforms;

use axum::{
    Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use utoipa::OpenApi;

use crate::api::error::ApiError;
use crate::api::middleware::{JwtAuthLayer, rate_limit_middleware};
use crate::api::openapi::ApiDoc;
use crate::api::server::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth::protected_router())
        .merge(platforms::protected_router())
        .merge(affiliate_links::protected_router())
        .merge(metrics::protected_router());

    // Without an auth service the protected routes must still refuse service.
    let protected = match state.auth_service.clone() {
        Some(auth_service) => protected.route_layer(JwtAuthLayer::new(auth_service)),
        None => protected.route_layer(middleware::from_fn(auth_unavailable)),
    };

    let mut router = Router::new()
        .merge(auth::router())
        .merge(platforms::router())
        .merge(affiliate_links::router())
        .merge(metrics::router())
        .merge(protected)
        .nest("/health", health::router())
        .route(OPENAPI_PATH, get(openapi_json))
        .fallback(route_not_found);

    if let Some(rate_limit) = state.rate_limit.clone() {
        router = router.layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));
    }

    router.with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

async fn auth_unavailable(_request: Request, _next: Next) -> Response {
    ApiError::service_unavailable("Authentication not configured").into_response()
}
