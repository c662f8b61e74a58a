//! JWT authentication middleware.
//!
//! Guards protected routes: the Bearer token is checked by
//! [`AuthService::authenticate`] on every request and the decoded
//! [`Claims`](crate::api::jwt::Claims) are inserted into request extensions.

use axum::{
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::api::auth_service::{AuthError, AuthService};
use crate::api::error::ApiError;

/// Extract the Bearer token from the Authorization header.
///
/// A missing header, a non-UTF-8 header or a non-Bearer scheme all count as
/// no token provided.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// JWT authentication layer for use with axum's layer system.
#[derive(Clone)]
pub struct JwtAuthLayer {
    auth_service: Arc<AuthService>,
}

impl JwtAuthLayer {
    /// Create a new JWT auth layer.
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }
}

impl<S> tower::Layer<S> for JwtAuthLayer {
    type Service = JwtAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JwtAuthService {
            inner,
            auth_service: self.auth_service.clone(),
        }
    }
}

/// JWT authentication service.
#[derive(Clone)]
pub struct JwtAuthService<S> {
    inner: S,
    auth_service: Arc<AuthService>,
}

impl<S, B> tower::Service<axum::http::Request<B>> for JwtAuthService<S>
where
    S: tower::Service<axum::http::Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: axum::http::Request<B>) -> Self::Future {
        let auth_service = self.auth_service.clone();
        // Take the instance that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let token = extract_bearer_token(request.headers()).ok();

            let claims = match auth_service.authenticate(token) {
                Ok(claims) => claims,
                Err(err) => {
                    debug!(path = %request.uri().path(), error = %err, "Rejected unauthenticated request");
                    return Ok(ApiError::from(err).into_response());
                }
            };

            let (mut parts, body) = request.into_parts();
            parts.extensions.insert(claims);
            let request = axum::http::Request::from_parts(parts, body);

            inner.call(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth_service::AuthConfig;
    use crate::api::jwt::{Claims, JwtService};
    use crate::database::models::UserDbModel;
    use crate::database::repositories::UserRepository;
    use axum::{Extension, Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    /// Token checks never touch the credential store.
    struct NoUsers;

    #[async_trait::async_trait]
    impl UserRepository for NoUsers {
        async fn create(&self, _user: &UserDbModel) -> crate::Result<()> {
            Ok(())
        }
        async fn find_by_id(&self, _id: &str) -> crate::Result<Option<UserDbModel>> {
            Ok(None)
        }
        async fn find_by_email(&self, _email: &str) -> crate::Result<Option<UserDbModel>> {
            Ok(None)
        }
        async fn count(&self) -> crate::Result<i64> {
            Ok(0)
        }
    }

    pub(super) fn create_test_services() -> (Arc<AuthService>, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new(
            "test-secret-key-32-chars-long!!",
            "test-issuer",
            "test-audience",
            Some(3600),
        ));
        let auth = AuthService::new(Arc::new(NoUsers), jwt.clone(), AuthConfig::default());
        (Arc::new(auth), jwt)
    }

    fn protected_router(auth: Arc<AuthService>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(|Extension(claims): Extension<Claims>| async move { claims.sub }),
            )
            .route_layer(JwtAuthLayer::new(auth))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        let headers = headers_with("Bearer valid_token_here");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "valid_token_here");
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        let headers = HeaderMap::new();
        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_layer_passes_claims_to_handler() {
        let (auth, jwt) = create_test_services();
        let token = jwt.generate_token("user-42", "user").unwrap();

        let response = protected_router(auth)
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"user-42");
    }

    #[tokio::test]
    async fn test_layer_rejects_missing_invalid_and_expired_tokens() {
        let (auth, jwt) = create_test_services();
        let router = protected_router(auth);

        let missing = router
            .clone()
            .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong_scheme = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong_scheme.status(), StatusCode::UNAUTHORIZED);

        let invalid = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let issued_at = (chrono::Utc::now().timestamp() - 7200) as u64;
        let expired = jwt.generate_token_at("user-42", "user", issued_at).unwrap();
        let expired = router
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {expired}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_issued_tokens_authenticate(
            user_id in "[a-zA-Z0-9_-]{1,50}",
            role in "[a-z]{1,12}",
        ) {
            let (auth, jwt) = tests::create_test_services();
            let token = jwt.generate_token(&user_id, &role).unwrap();

            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

            let claims = auth.authenticate(extract_bearer_token(&headers).ok()).unwrap();
            prop_assert_eq!(&claims.sub, &user_id);
            prop_assert_eq!(&claims.role, &role);
        }

        #[test]
        fn prop_random_strings_never_authenticate(invalid_token in "[a-zA-Z0-9]{10,100}") {
            let (auth, _) = tests::create_test_services();
            prop_assert!(auth.authenticate(Some(&invalid_token)).is_err());
        }
    }
}
