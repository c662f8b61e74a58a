//! Platform routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::api::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::api::models::{
    CreatePlatformRequest, DataResponse, MessageResponse, PlatformBody, PlatformListResponse,
    PlatformResponse, UpdatePlatformRequest,
};
use crate::api::server::AppState;
use crate::api::validation::Validated;

/// Public platform routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/platforms", get(list_platforms))
        .route("/platform/{id}", get(get_platform))
}

/// Platform routes that require a valid bearer token.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/platform", post(create_platform))
        .route(
            "/platform/{id}",
            axum::routing::put(update_platform).delete(delete_platform),
        )
}

/// Create a platform.
#[utoipa::path(
    post,
    path = "/platform",
    tag = "platforms",
    security(("bearer_auth" = [])),
    request_body = CreatePlatformRequest,
    responses(
        (status = 201, description = "Platform created", body = DataResponse<PlatformResponse>),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
        (status = 401, description = "No token provided", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn create_platform(
    State(state): State<AppState>,
    Validated(request): Validated<CreatePlatformRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<PlatformResponse>>)> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let platform = resources.create_platform(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "Platform created successfully",
            platform.into(),
        )),
    ))
}

/// List every platform.
#[utoipa::path(
    get,
    path = "/platforms",
    tag = "platforms",
    responses(
        (status = 200, description = "All platforms", body = PlatformListResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn list_platforms(State(state): State<AppState>) -> ApiResult<Json<PlatformListResponse>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let platforms = resources.list_platforms().await?;

    Ok(Json(PlatformListResponse {
        success: true,
        platforms: platforms.into_iter().map(Into::into).collect(),
    }))
}

/// Get a platform by id.
#[utoipa::path(
    get,
    path = "/platform/{id}",
    tag = "platforms",
    params(("id" = String, Path, description = "Platform id")),
    responses(
        (status = 200, description = "Platform", body = PlatformBody),
        (status = 404, description = "Platform not found", body = ApiErrorResponse)
    )
)]
pub async fn get_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlatformBody>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let platform = resources.get_platform(&id).await?;

    Ok(Json(PlatformBody {
        success: true,
        platform: platform.into(),
    }))
}

/// Merge the given fields into a platform.
#[utoipa::path(
    put,
    path = "/platform/{id}",
    tag = "platforms",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Platform id")),
    request_body = UpdatePlatformRequest,
    responses(
        (status = 200, description = "Updated platform", body = PlatformBody),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
        (status = 404, description = "Platform not found", body = ApiErrorResponse)
    )
)]
pub async fn update_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(patch): Validated<UpdatePlatformRequest>,
) -> ApiResult<Json<PlatformBody>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let platform = resources.update_platform(&id, &patch).await?;

    Ok(Json(PlatformBody {
        success: true,
        platform: platform.into(),
    }))
}

/// Delete a platform. Affiliate links that reference it are kept.
#[utoipa::path(
    delete,
    path = "/platform/{id}",
    tag = "platforms",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Platform id")),
    responses(
        (status = 200, description = "Platform deleted", body = MessageResponse),
        (status = 404, description = "Platform not found", body = ApiErrorResponse)
    )
)]
pub async fn delete_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    resources.delete_platform(&id).await?;
    Ok(Json(MessageResponse::new("Platform deleted successfully")))
}
