//! Resource service for platforms, affiliate links and performance metrics.
//!
//! Each operation is a single store call, optionally preceded by a parent
//! lookup when strict referential integrity is enabled.

use std::sync::Arc;

use tracing::{debug, info};

use crate::Error;
use crate::database::models::{
    AffiliateLinkDbModel, MetricSummaryDbModel, PerformanceMetricDbModel, PlatformDbModel,
};
use crate::database::repositories::{
    AffiliateLinkRepository, PerformanceMetricRepository, PlatformRepository,
};

use super::models::{
    CreateAffiliateLinkRequest, CreatePlatformRequest, RecordMetricRequest, UpdatePlatformRequest,
};
use super::validation::{FieldViolation, RequestSchema};

/// Resource service errors.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ResourceError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<Error> for ResourceError {
    fn from(err: Error) -> Self {
        ResourceError::Storage(err.to_string())
    }
}

type ResourceResult<T> = Result<T, ResourceError>;

/// CRUD operations over the resource store.
pub struct ResourceService {
    platforms: Arc<dyn PlatformRepository>,
    links: Arc<dyn AffiliateLinkRepository>,
    metrics: Arc<dyn PerformanceMetricRepository>,
    strict_referential_integrity: bool,
}

impl ResourceService {
    pub fn new(
        platforms: Arc<dyn PlatformRepository>,
        links: Arc<dyn AffiliateLinkRepository>,
        metrics: Arc<dyn PerformanceMetricRepository>,
    ) -> Self {
        Self {
            platforms,
            links,
            metrics,
            strict_referential_integrity: false,
        }
    }

    /// Reject links and metrics whose parent record does not exist.
    pub fn with_strict_referential_integrity(mut self, enabled: bool) -> Self {
        self.strict_referential_integrity = enabled;
        self
    }

    // ------------------------------------------------------------------
    // Platforms
    // ------------------------------------------------------------------

    pub async fn create_platform(
        &self,
        request: &CreatePlatformRequest,
    ) -> ResourceResult<PlatformDbModel> {
        request.check().map_err(ResourceError::Validation)?;

        let mut platform = PlatformDbModel::new(request.name.trim(), &request.description);
        platform.set_niches(request.niches.as_deref().unwrap_or_default());
        platform.set_join_steps(request.join_steps.as_deref().unwrap_or_default());
        platform.commission_rate = request.commission_rate.clone();
        platform.api_url = request.api_url.clone();

        self.platforms.create(&platform).await?;
        info!(platform_id = %platform.id, name = %platform.name, "Platform created");
        Ok(platform)
    }

    pub async fn list_platforms(&self) -> ResourceResult<Vec<PlatformDbModel>> {
        Ok(self.platforms.list().await?)
    }

    pub async fn get_platform(&self, id: &str) -> ResourceResult<PlatformDbModel> {
        self.platforms
            .find_by_id(id)
            .await?
            .ok_or_else(|| ResourceError::not_found("Platform", id))
    }

    /// Merge the present fields of `patch` into the stored platform.
    pub async fn update_platform(
        &self,
        id: &str,
        patch: &UpdatePlatformRequest,
    ) -> ResourceResult<PlatformDbModel> {
        patch.check().map_err(ResourceError::Validation)?;

        let mut platform = self.get_platform(id).await?;
        if let Some(name) = &patch.name {
            platform.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            platform.description = description.clone();
        }
        if let Some(niches) = &patch.niches {
            platform.set_niches(niches);
        }
        if let Some(rate) = &patch.commission_rate {
            platform.commission_rate = Some(rate.clone());
        }
        if let Some(api_url) = &patch.api_url {
            platform.api_url = Some(api_url.clone());
        }
        if let Some(steps) = &patch.join_steps {
            platform.set_join_steps(steps);
        }
        platform.touch();

        // Row may vanish between the read and the write.
        if !self.platforms.update(&platform).await? {
            return Err(ResourceError::not_found("Platform", id));
        }
        info!(platform_id = %id, "Platform updated");
        Ok(platform)
    }

    /// Delete a platform. Links referencing it are left in place.
    pub async fn delete_platform(&self, id: &str) -> ResourceResult<()> {
        if !self.platforms.delete(id).await? {
            return Err(ResourceError::not_found("Platform", id));
        }
        info!(platform_id = %id, "Platform deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Affiliate links
    // ------------------------------------------------------------------

    pub async fn create_link(
        &self,
        request: &CreateAffiliateLinkRequest,
    ) -> ResourceResult<AffiliateLinkDbModel> {
        request.check().map_err(ResourceError::Validation)?;

        if self.strict_referential_integrity
            && self.platforms.find_by_id(&request.platform_id).await?.is_none()
        {
            debug!(platform_id = %request.platform_id, "Rejecting link to unknown platform");
            return Err(ResourceError::Validation(vec![FieldViolation::new(
                "platformId",
                "platformId does not reference an existing platform",
            )]));
        }

        let link = AffiliateLinkDbModel::new(&request.url, &request.platform_id);
        self.links.create(&link).await?;
        info!(link_id = %link.id, platform_id = %link.platform_id, "Affiliate link created");
        Ok(link)
    }

    pub async fn list_links(&self) -> ResourceResult<Vec<AffiliateLinkDbModel>> {
        Ok(self.links.list().await?)
    }

    pub async fn get_link(&self, id: &str) -> ResourceResult<AffiliateLinkDbModel> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| ResourceError::not_found("Affiliate link", id))
    }

    // ------------------------------------------------------------------
    // Performance metrics
    // ------------------------------------------------------------------

    /// Insert a new sample. Repeated calls for one link create separate rows.
    pub async fn record_metric(
        &self,
        request: &RecordMetricRequest,
    ) -> ResourceResult<PerformanceMetricDbModel> {
        request.check().map_err(ResourceError::Validation)?;

        if self.strict_referential_integrity
            && self
                .links
                .find_by_id(&request.affiliate_link_id)
                .await?
                .is_none()
        {
            debug!(link_id = %request.affiliate_link_id, "Rejecting metric for unknown link");
            return Err(ResourceError::Validation(vec![FieldViolation::new(
                "affiliateLinkId",
                "affiliateLinkId does not reference an existing affiliate link",
            )]));
        }

        let metric = PerformanceMetricDbModel::new(&request.affiliate_link_id)
            .with_counts(request.clicks, request.conversions);
        self.metrics.create(&metric).await?;
        debug!(
            metric_id = %metric.id,
            link_id = %metric.affiliate_link_id,
            clicks = metric.clicks,
            conversions = metric.conversions,
            "Performance metric recorded"
        );
        Ok(metric)
    }

    pub async fn list_metrics(&self) -> ResourceResult<Vec<PerformanceMetricDbModel>> {
        Ok(self.metrics.list().await?)
    }

    pub async fn list_metrics_for_link(
        &self,
        affiliate_link_id: &str,
    ) -> ResourceResult<Vec<PerformanceMetricDbModel>> {
        Ok(self.metrics.list_for_link(affiliate_link_id).await?)
    }

    /// Read-time totals for one link; zero when nothing was recorded.
    pub async fn summarize_link(
        &self,
        affiliate_link_id: &str,
    ) -> ResourceResult<MetricSummaryDbModel> {
        Ok(self.metrics.summarize_for_link(affiliate_link_id).await?)
    }
}
