//! API request and response models (DTOs).
//!
//! Wire names are camelCase. Every success body carries `success: true`
//! next to either a `data` field or a named payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{self, RequestSchema, Schema};
use crate::database::models::{
    AffiliateLinkDbModel, MetricSummaryDbModel, PerformanceMetricDbModel, PlatformDbModel,
    UserDbModel,
};

// ============================================================================
// Envelopes
// ============================================================================

/// Success envelope with a `data` payload and an optional message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Success envelope carrying only a message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RequestSchema for RegisterRequest {
    fn schema() -> &'static Schema {
        &validation::REGISTER
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestSchema for LoginRequest {
    fn schema() -> &'static Schema {
        &validation::LOGIN
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    /// Signed bearer token
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserDbModel> for UserResponse {
    fn from(user: UserDbModel) -> Self {
        let created_at = user.get_created_at();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at,
        }
    }
}

/// Identity decoded from the presented token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: String,
    pub role: String,
}

// ============================================================================
// Platforms
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlatformRequest {
    pub name: String,
    pub description: String,
    /// Absent and `null` both mean no niches.
    pub niches: Option<Vec<String>>,
    pub commission_rate: Option<String>,
    pub api_url: Option<String>,
    pub join_steps: Option<Vec<String>>,
}

impl RequestSchema for CreatePlatformRequest {
    fn schema() -> &'static Schema {
        &validation::CREATE_PLATFORM
    }
}

/// Partial platform update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlatformRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub niches: Option<Vec<String>>,
    pub commission_rate: Option<String>,
    pub api_url: Option<String>,
    pub join_steps: Option<Vec<String>>,
}

impl RequestSchema for UpdatePlatformRequest {
    fn schema() -> &'static Schema {
        &validation::UPDATE_PLATFORM
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub niches: Vec<String>,
    pub commission_rate: Option<String>,
    pub api_url: Option<String>,
    pub join_steps: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlatformDbModel> for PlatformResponse {
    fn from(platform: PlatformDbModel) -> Self {
        let niches = platform.get_niches();
        let join_steps = platform.get_join_steps();
        let created_at = platform.get_created_at();
        let updated_at = platform.get_updated_at();
        Self {
            id: platform.id,
            name: platform.name,
            description: platform.description,
            niches,
            commission_rate: platform.commission_rate,
            api_url: platform.api_url,
            join_steps,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlatformBody {
    pub success: bool,
    pub platform: PlatformResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlatformListResponse {
    pub success: bool,
    pub platforms: Vec<PlatformResponse>,
}

// ============================================================================
// Affiliate links
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffiliateLinkRequest {
    /// http, https or ftp URL
    pub url: String,
    pub platform_id: String,
}

impl RequestSchema for CreateAffiliateLinkRequest {
    fn schema() -> &'static Schema {
        &validation::CREATE_AFFILIATE_LINK
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLinkResponse {
    pub id: String,
    pub url: String,
    pub platform_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<AffiliateLinkDbModel> for AffiliateLinkResponse {
    fn from(link: AffiliateLinkDbModel) -> Self {
        let created_at = link.get_created_at();
        Self {
            id: link.id,
            url: link.url,
            platform_id: link.platform_id,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLinkBody {
    pub success: bool,
    pub affiliate_link: AffiliateLinkResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLinkListResponse {
    pub success: bool,
    pub affiliate_links: Vec<AffiliateLinkResponse>,
}

// ============================================================================
// Performance metrics
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetricRequest {
    pub affiliate_link_id: String,
    pub clicks: i64,
    pub conversions: i64,
}

impl RequestSchema for RecordMetricRequest {
    fn schema() -> &'static Schema {
        &validation::RECORD_METRIC
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse {
    pub id: String,
    pub affiliate_link_id: String,
    pub clicks: i64,
    pub conversions: i64,
    pub created_at: DateTime<Utc>,
}

impl From<PerformanceMetricDbModel> for MetricResponse {
    fn from(metric: PerformanceMetricDbModel) -> Self {
        let created_at = metric.get_created_at();
        Self {
            id: metric.id,
            affiliate_link_id: metric.affiliate_link_id,
            clicks: metric.clicks,
            conversions: metric.conversions,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricListResponse {
    pub success: bool,
    pub metrics: Vec<MetricResponse>,
}

/// Totals over every sample recorded for one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummaryResponse {
    pub affiliate_link_id: String,
    /// Number of samples summed
    pub records: i64,
    pub clicks: i64,
    pub conversions: i64,
}

impl From<MetricSummaryDbModel> for MetricSummaryResponse {
    fn from(summary: MetricSummaryDbModel) -> Self {
        Self {
            affiliate_link_id: summary.affiliate_link_id,
            records: summary.records,
            clicks: summary.clicks,
            conversions: summary.conversions,
        }
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    pub version: String,
    pub database: String,
}
