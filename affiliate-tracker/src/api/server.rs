//! API server setup and configuration.

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Response};
use axum::response::IntoResponse;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::api::auth_service::AuthService;
use crate::api::error::ApiError;
use crate::api::jwt::JwtService;
use crate::api::middleware::RateLimitState;
use crate::api::resource_service::ResourceService;
use crate::api::routes;
use crate::config::{AppConfig, non_empty_var};
use crate::database::DbPool;
use crate::database::repositories::{
    SqlxAffiliateLinkRepository, SqlxPerformanceMetricRepository, SqlxPlatformRepository,
    SqlxUserRepository,
};
use crate::error::Result;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Requests carrying larger bodies are rejected with 413.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// The single allowed origin; any origin when `None`
    pub cors_origin: Option<String>,
    /// Request body size limit in bytes
    pub body_limit: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
            cors_origin: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ApiServerConfig {
    /// Load API server config from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `API_BIND_ADDRESS` (e.g. "0.0.0.0")
    /// - `API_PORT`, or `PORT` when unset (e.g. "8080")
    /// - `CORS_ORIGIN` (e.g. "https://dashboard.example.com")
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(bind_address) = std::env::var("API_BIND_ADDRESS")
            && !bind_address.trim().is_empty()
        {
            config.bind_address = bind_address;
        }

        if let Some(port) = non_empty_var("API_PORT").or_else(|| non_empty_var("PORT"))
            && let Ok(parsed) = port.parse::<u16>()
        {
            config.port = parsed;
        }

        config.cors_origin = non_empty_var("CORS_ORIGIN");

        config
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Registration, login and the token gate on protected routes
    pub auth_service: Option<Arc<AuthService>>,
    /// Platforms, affiliate links and metrics
    pub resource_service: Option<Arc<ResourceService>>,
    /// Global per-client limiter; unlimited when `None`
    pub rate_limit: Option<RateLimitState>,
    /// Pool probed by the health endpoints
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Create a new application state without services (for testing).
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            auth_service: None,
            resource_service: None,
            rate_limit: None,
            pool: None,
        }
    }

    /// Wire every repository and service over `pool`.
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt.secret,
            &config.jwt.issuer,
            &config.jwt.audience,
            Some(config.auth.access_token_expiration_secs),
        ));

        let auth_service = AuthService::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            jwt_service,
            config.auth.clone(),
        );

        let resource_service = ResourceService::new(
            Arc::new(SqlxPlatformRepository::new(pool.clone())),
            Arc::new(SqlxAffiliateLinkRepository::new(pool.clone())),
            Arc::new(SqlxPerformanceMetricRepository::new(pool.clone())),
        )
        .with_strict_referential_integrity(config.strict_referential_integrity);

        Self::new()
            .with_auth_service(Arc::new(auth_service))
            .with_resource_service(Arc::new(resource_service))
            .with_rate_limit(RateLimitState::new(&config.rate_limit))
            .with_pool(pool)
    }

    /// Set the auth service.
    pub fn with_auth_service(mut self, auth_service: Arc<AuthService>) -> Self {
        self.auth_service = Some(auth_service);
        self
    }

    /// Set the resource service.
    pub fn with_resource_service(mut self, resource_service: Arc<ResourceService>) -> Self {
        self.resource_service = Some(resource_service);
        self
    }

    /// Set the rate limiter.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitState) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Set the pool used for health probes.
    pub fn with_pool(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a handler panic as the generic 500 body. Detail stays in the log.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<axum::body::Body> {
    let detail = if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    ApiError::internal().into_response()
}

fn is_health_probe(req: &Request) -> bool {
    req.uri().path().starts_with("/health")
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
    cancel_token: CancellationToken,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(config: ApiServerConfig) -> Self {
        Self {
            config,
            state: AppState::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Create with custom state.
    pub fn with_state(config: ApiServerConfig, state: AppState) -> Self {
        Self {
            config,
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get the cancellation token for graceful shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        if !self.config.enable_cors {
            return None;
        }

        let cors = CorsLayer::new().allow_methods(AnyOrigin).allow_headers(AnyOrigin);
        match self.config.cors_origin.as_deref() {
            None => Some(cors.allow_origin(AnyOrigin)),
            Some(origin) => match HeaderValue::from_str(origin) {
                Ok(origin) => Some(cors.allow_origin(origin)),
                Err(e) => {
                    tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin; cross-origin requests disabled");
                    None
                }
            },
        }
    }

    /// Build the router with all middleware and routes.
    pub fn build_router(&self) -> Router {
        let mut router = routes::create_router(self.state.clone())
            .layer(RequestBodyLimitLayer::new(self.config.body_limit))
            .layer(CatchPanicLayer::custom(panic_response));

        // Add CORS if enabled
        if let Some(cors) = self.cors_layer() {
            router = router.layer(cors);
        }

        // Add tracing
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    if is_health_probe(req) {
                        Span::none()
                    } else {
                        let mut make_span =
                            tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO);
                        use tower_http::trace::MakeSpan;
                        make_span.make_span(req)
                    }
                })
                .on_request(|req: &Request, span: &Span| {
                    if span.is_disabled() || is_health_probe(req) {
                        return;
                    }
                    let mut on_request =
                        tower_http::trace::DefaultOnRequest::new().level(tracing::Level::INFO);
                    use tower_http::trace::OnRequest;
                    on_request.on_request(req, span);
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        if span.is_disabled() {
                            return;
                        }
                        let on_response =
                            tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO);
                        use tower_http::trace::OnResponse;
                        on_response.on_response(res, latency, span);
                    },
                )
                .on_failure(
                    |class: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     span: &Span| {
                        if span.is_disabled() {
                            return;
                        }
                        let mut on_failure =
                            tower_http::trace::DefaultOnFailure::new().level(tracing::Level::ERROR);
                        use tower_http::trace::OnFailure;
                        on_failure.on_failure(class, latency, span);
                    },
                ),
        );

        // Outermost, so every response carries the id.
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Start the server.
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| crate::error::Error::ApiError(format!("Invalid address: {}", e)))?;

        let router = self.build_router();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("API server listening on http://{}", addr);

        let cancel_token = self.cancel_token.clone();

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            tracing::info!("API server shutting down...");
        })
        .await
        .map_err(|e| crate::error::Error::ApiError(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[test]
    fn test_config_defaults() {
        let config = ApiServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert!(config.enable_cors);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.start_time.elapsed().as_secs() < 1);
        assert!(state.auth_service.is_none());
        assert!(state.rate_limit.is_none());
    }

    #[test]
    fn test_server_creation() {
        let config = ApiServerConfig::default();
        let server = ApiServer::new(config);

        // Server should have a valid cancel token
        let token = server.cancel_token();
        assert!(!token.is_cancelled());
        server.shutdown();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_panic_response_hides_detail() {
        let response = panic_response(Box::new("secret internals"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let server = ApiServer::new(ApiServerConfig::default());
        let response = server
            .build_router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unserviced_state_refuses_protected_routes() {
        let server = ApiServer::new(ApiServerConfig::default());
        let response = server
            .build_router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
