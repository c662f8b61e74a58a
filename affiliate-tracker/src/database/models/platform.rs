//! Platform database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::json::{self, JsonContext};

/// Affiliate platform database model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlatformDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    pub name: String,
    pub description: String,
    /// JSON array of niche names, order preserved
    pub niches: String,
    /// Free-form commission description (e.g. "30% recurring")
    pub commission_rate: Option<String>,
    pub api_url: Option<String>,
    /// JSON array of onboarding steps, order preserved
    pub join_steps: String,
    /// Unix epoch milliseconds (UTC) when the platform was created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) when the platform was last updated.
    pub updated_at: i64,
}

impl PlatformDbModel {
    /// Create a new platform with empty list attributes.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            niches: "[]".to_string(),
            commission_rate: None,
            api_url: None,
            join_steps: "[]".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the niches as a `Vec<String>`.
    pub fn get_niches(&self) -> Vec<String> {
        json::parse_or_default(
            &self.niches,
            JsonContext::platform(&self.id, "niches"),
            "Invalid platform niches JSON; treating as empty",
        )
    }

    /// Set the niches from a `Vec<String>`.
    pub fn set_niches(&mut self, niches: &[String]) {
        self.niches = json::to_string_or_fallback(
            niches,
            "[]",
            JsonContext::platform(&self.id, "niches"),
            "Failed to serialize platform niches; storing empty list",
        );
    }

    /// Get the join steps as a `Vec<String>`.
    pub fn get_join_steps(&self) -> Vec<String> {
        json::parse_or_default(
            &self.join_steps,
            JsonContext::platform(&self.id, "join_steps"),
            "Invalid platform join_steps JSON; treating as empty",
        )
    }

    /// Set the join steps from a `Vec<String>`.
    pub fn set_join_steps(&mut self, steps: &[String]) {
        self.join_steps = json::to_string_or_fallback(
            steps,
            "[]",
            JsonContext::platform(&self.id, "join_steps"),
            "Failed to serialize platform join_steps; storing empty list",
        );
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.updated_at)
    }

    /// Update the updated_at timestamp to now.
    pub fn touch(&mut self) {
        self.updated_at = crate::database::time::now_ms();
    }
}
