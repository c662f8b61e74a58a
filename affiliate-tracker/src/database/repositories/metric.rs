//! Performance metric repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::{MetricSummaryDbModel, PerformanceMetricDbModel};

#[async_trait]
pub trait PerformanceMetricRepository: Send + Sync {
    /// Insert one sample. Never merges with existing rows.
    async fn create(&self, metric: &PerformanceMetricDbModel) -> Result<()>;

    /// List every sample in storage order.
    async fn list(&self) -> Result<Vec<PerformanceMetricDbModel>>;

    /// List the samples recorded for one affiliate link.
    async fn list_for_link(&self, affiliate_link_id: &str)
    -> Result<Vec<PerformanceMetricDbModel>>;

    /// Sum clicks and conversions over all samples of one link.
    async fn summarize_for_link(&self, affiliate_link_id: &str) -> Result<MetricSummaryDbModel>;
}

/// SQLx implementation of PerformanceMetricRepository.
pub struct SqlxPerformanceMetricRepository {
    pool: SqlitePool,
}

impl SqlxPerformanceMetricRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformanceMetricRepository for SqlxPerformanceMetricRepository {
    async fn create(&self, metric: &PerformanceMetricDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO performance_metrics (id, affiliate_link_id, clicks, conversions, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&metric.id)
        .bind(&metric.affiliate_link_id)
        .bind(metric.clicks)
        .bind(metric.conversions)
        .bind(metric.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PerformanceMetricDbModel>> {
        let metrics =
            sqlx::query_as::<_, PerformanceMetricDbModel>("SELECT * FROM performance_metrics")
                .fetch_all(&self.pool)
                .await?;
        Ok(metrics)
    }

    async fn list_for_link(
        &self,
        affiliate_link_id: &str,
    ) -> Result<Vec<PerformanceMetricDbModel>> {
        let metrics = sqlx::query_as::<_, PerformanceMetricDbModel>(
            "SELECT * FROM performance_metrics WHERE affiliate_link_id = ? ORDER BY created_at ASC",
        )
        .bind(affiliate_link_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(metrics)
    }

    async fn summarize_for_link(&self, affiliate_link_id: &str) -> Result<MetricSummaryDbModel> {
        // SQLite's SUM errors on i64 overflow, so totals are folded here and clamp instead.
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT clicks, conversions FROM performance_metrics WHERE affiliate_link_id = ?",
        )
        .bind(affiliate_link_id)
        .fetch_all(&self.pool)
        .await?;

        let (clicks, conversions) = counts
            .iter()
            .fold((0i64, 0i64), |(clicks, conversions), (c, v)| {
                (clicks.saturating_add(*c), conversions.saturating_add(*v))
            });

        Ok(MetricSummaryDbModel {
            affiliate_link_id: affiliate_link_id.to_string(),
            records: counts.len() as i64,
            clicks,
            conversions,
        })
    }
}
