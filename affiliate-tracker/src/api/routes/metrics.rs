//! Performance metric routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::api::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::api::models::{DataResponse, MetricListResponse, MetricResponse, RecordMetricRequest};
use crate::api::server::AppState;
use crate::api::validation::Validated;

pub fn router() -> Router<AppState> {
    Router::new().route("/performance-metrics", get(list_metrics))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/performance-metric", post(record_metric))
}

/// Record one click/conversion sample. Each call adds a new row.
#[utoipa::path(
    post,
    path = "/performance-metric",
    tag = "metrics",
    security(("bearer_auth" = [])),
    request_body = RecordMetricRequest,
    responses(
        (status = 201, description = "Sample recorded", body = DataResponse<MetricResponse>),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn record_metric(
    State(state): State<AppState>,
    Validated(request): Validated<RecordMetricRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<MetricResponse>>)> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let metric = resources.record_metric(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "Performance metric recorded successfully",
            metric.into(),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/performance-metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "All samples", body = MetricListResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse)
    )
)]
pub async fn list_metrics(State(state): State<AppState>) -> ApiResult<Json<MetricListResponse>> {
    let resources = state
        .resource_service
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Resource service not available"))?;
    let metrics = resources.list_metrics().await?;

    Ok(Json(MetricListResponse {
        success: true,
        metrics: metrics.into_iter().map(Into::into).collect(),
    }))
}
