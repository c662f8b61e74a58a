//! Authentication routes.
//!
//! Registration and login are public; `/me` sits behind the token gate.

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::api::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::api::jwt::Claims;
use crate::api::models::{
    DataResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UserResponse,
};
use crate::api::server::AppState;
use crate::api::validation::Validated;

/// Public auth routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Auth routes that require a valid bearer token.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = DataResponse<UserResponse>),
        (status = 400, description = "Validation failed or email already registered", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Validated(request): Validated<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let auth_service = state
        .auth_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Authentication not configured"))?;

    let user = auth_service.register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "User registered successfully",
            user.into(),
        )),
    ))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Validation failed or invalid credentials", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Validated(request): Validated<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth_service = state
        .auth_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Authentication not configured"))?;

    let auth = auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
    }))
}

/// Identity carried by the presented token.
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token identity", body = DataResponse<MeResponse>),
        (status = 401, description = "No token provided", body = ApiErrorResponse),
        (status = 400, description = "Invalid or expired token", body = ApiErrorResponse)
    )
)]
pub async fn me(Extension(claims): Extension<Claims>) -> Json<DataResponse<MeResponse>> {
    Json(DataResponse::new(MeResponse {
        id: claims.sub,
        role: claims.role,
    }))
}
