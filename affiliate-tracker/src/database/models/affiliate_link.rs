//! Affiliate link database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tracked outbound URL belonging to a platform.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AffiliateLinkDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    pub url: String,
    /// Referenced platform id; not guaranteed to resolve.
    pub platform_id: String,
    /// Unix epoch milliseconds (UTC) when the link was created.
    pub created_at: i64,
}

impl AffiliateLinkDbModel {
    pub fn new(url: impl Into<String>, platform_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            platform_id: platform_id.into(),
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }
}
