//! Performance metric database models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded click/conversion sample for an affiliate link.
///
/// Every recording inserts a new row; rows are never merged.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PerformanceMetricDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// Referenced affiliate link id; not guaranteed to resolve.
    pub affiliate_link_id: String,
    pub clicks: i64,
    pub conversions: i64,
    /// Unix epoch milliseconds (UTC) when the sample was recorded.
    pub created_at: i64,
}

impl PerformanceMetricDbModel {
    /// Create a sample with zeroed counters.
    pub fn new(affiliate_link_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            affiliate_link_id: affiliate_link_id.into(),
            clicks: 0,
            conversions: 0,
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn with_counts(mut self, clicks: i64, conversions: i64) -> Self {
        self.clicks = clicks;
        self.conversions = conversions;
        self
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }
}

/// Read-time totals over every sample recorded for one link.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MetricSummaryDbModel {
    pub affiliate_link_id: String,
    pub records: i64,
    pub clicks: i64,
    pub conversions: i64,
}
