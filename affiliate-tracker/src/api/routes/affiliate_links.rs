//! Affiliate link routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::api::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::api::models::{
    AffiliateLinkBody, AffiliateLinkListResponse, AffiliateLinkResponse,
    CreateAffiliateLinkRequest, DataResponse,
    MetricListResponse, MetricSummaryResponse,
};
use crate::api::server::AppState;
use crate::api::validation::Validated;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/affiliate-links", get(list_links))
        .route("/affiliate-link/{id}", get(get_link))
        .route("/affiliate-link/{id}/metrics", get(list_link_metrics))
        .route("/affiliate-link/{id}/performance", get(link_performance))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/affiliate-link", post(create_link))
}

/// Create an affiliate link.
#[utoipa::path(
    post,
    path = "/affiliate-link",
    tag = "affiliate-links",
    security(("bearer_auth" = [])),
    request_body = CreateAffiliateLinkRequest,
    responses(
        (status = 201, description = "Link created", body = DataResponse<AffiliateLinkResponse>),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn create_link(
    State(state): State<AppState>,
    Validated(request): Validated<CreateAffiliateLinkRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<AffiliateLinkResponse>>)> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let link = resources.create_link(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "Affiliate link created successfully",
            link.into(),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/affiliate-links",
    tag = "affiliate-links",
    responses(
        (status = 200, description = "All affiliate links", body = AffiliateLinkListResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn list_links(
    State(state): State<AppState>,
) -> ApiResult<Json<AffiliateLinkListResponse>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let links = resources.list_links().await?;

    Ok(Json(AffiliateLinkListResponse {
        success: true,
        affiliate_links: links.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/affiliate-link/{id}",
    tag = "affiliate-links",
    params(("id" = String, Path, description = "Affiliate link id")),
    responses(
        (status = 200, description = "Affiliate link", body = AffiliateLinkBody),
        (status = 404, description = "Affiliate link not found", body = ApiErrorResponse)
    )
)]
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AffiliateLinkBody>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let link = resources.get_link(&id).await?;

    Ok(Json(AffiliateLinkBody {
        success: true,
        affiliate_link: link.into(),
    }))
}

/// Samples recorded for one link.
#[utoipa::path(
    get,
    path = "/affiliate-link/{id}/metrics",
    tag = "affiliate-links",
    params(("id" = String, Path, description = "Affiliate link id")),
    responses(
        (status = 200, description = "Samples for the link", body = MetricListResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn list_link_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MetricListResponse>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let metrics = resources.list_metrics_for_link(&id).await?;

    Ok(Json(MetricListResponse {
        success: true,
        metrics: metrics.into_iter().map(Into::into).collect(),
    }))
}

/// Click and conversion totals for one link.
#[utoipa::path(
    get,
    path = "/affiliate-link/{id}/performance",
    tag = "affiliate-links",
    params(("id" = String, Path, description = "Affiliate link id")),
    responses(
        (status = 200, description = "Totals for the link", body = DataResponse<MetricSummaryResponse>),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn link_performance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<MetricSummaryResponse>>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let summary = resources.summarize_link(&id).await?;
    Ok(Json(DataResponse::new(summary.into())))
}
