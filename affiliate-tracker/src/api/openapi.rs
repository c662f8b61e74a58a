//! OpenAPI documentation configuration.
//!
//! The document is generated with `utoipa` and served as JSON at
//! [`crate::api::routes::OPENAPI_PATH`].

use utoipa::OpenApi;

use crate::api::error::ApiErrorResponse;
use crate::api::models::{
    AffiliateLinkBody, AffiliateLinkListResponse, AffiliateLinkResponse, CreateAffiliateLinkRequest,
    CreatePlatformRequest, HealthResponse, LoginRequest, LoginResponse, MeResponse,
    MessageResponse, MetricListResponse, MetricResponse, MetricSummaryResponse, PlatformBody,
    PlatformListResponse, PlatformResponse, RecordMetricRequest, RegisterRequest,
    UpdatePlatformRequest, UserResponse,
};
use crate::api::validation::FieldViolation;

/// OpenAPI documentation for the affiliate-tracker API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "affiliate-tracker API",
        version = "0.1.0",
        description = "REST API for registering affiliate platforms and links and recording their click and conversion metrics.",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    tags(
        (name = "health", description = "Health check endpoints for monitoring and orchestration"),
        (name = "auth", description = "Registration, login and token introspection"),
        (name = "platforms", description = "Affiliate platform management"),
        (name = "affiliate-links", description = "Affiliate link management and per-link reporting"),
        (name = "metrics", description = "Click and conversion samples")
    ),
    paths(
        // Health endpoints
        crate::api::routes::health::health_check,
        crate::api::routes::health::readiness_check,
        crate::api::routes::health::liveness_check,
        // Auth endpoints
        crate::api::routes::auth::register,
        crate::api::routes::auth::login,
        crate::api::routes::auth::me,
        // Platform endpoints
        crate::api::routes::platforms::create_platform,
        crate::api::routes::platforms::list_platforms,
        crate::api::routes::platforms::get_platform,
        crate::api::routes::platforms::update_platform,
        crate::api::routes::platforms::delete_platform,
        // Affiliate link endpoints
        crate::api::routes::affiliate_links::create_link,
        crate::api::routes::affiliate_links::list_links,
        crate::api::routes::affiliate_links::get_link,
        crate::api::routes::affiliate_links::list_link_metrics,
        crate::api::routes::affiliate_links::link_performance,
        // Metric endpoints
        crate::api::routes::metrics::record_metric,
        crate::api::routes::metrics::list_metrics,
    ),
    components(
        schemas(
            ApiErrorResponse,
            FieldViolation,
            MessageResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserResponse,
            MeResponse,
            CreatePlatformRequest,
            UpdatePlatformRequest,
            PlatformResponse,
            PlatformBody,
            PlatformListResponse,
            CreateAffiliateLinkRequest,
            AffiliateLinkResponse,
            AffiliateLinkBody,
            AffiliateLinkListResponse,
            RecordMetricRequest,
            MetricResponse,
            MetricListResponse,
            MetricSummaryResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme addon for Bearer JWT authentication.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
