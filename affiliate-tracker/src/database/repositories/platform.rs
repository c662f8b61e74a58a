//! Platform repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::PlatformDbModel;

/// Platform repository trait.
#[async_trait]
pub trait PlatformRepository: Send + Sync {
    async fn create(&self, platform: &PlatformDbModel) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<PlatformDbModel>>;

    /// List every platform in storage order.
    async fn list(&self) -> Result<Vec<PlatformDbModel>>;

    /// Persist all mutable columns of an existing platform.
    ///
    /// Returns `false` when no row has the platform's id.
    async fn update(&self, platform: &PlatformDbModel) -> Result<bool>;

    /// Delete a platform by id. Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx implementation of PlatformRepository.
pub struct SqlxPlatformRepository {
    pool: SqlitePool,
}

impl SqlxPlatformRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlatformRepository for SqlxPlatformRepository {
    async fn create(&self, platform: &PlatformDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO platforms (
                id, name, description, niches, commission_rate, api_url,
                join_steps, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&platform.id)
        .bind(&platform.name)
        .bind(&platform.description)
        .bind(&platform.niches)
        .bind(&platform.commission_rate)
        .bind(&platform.api_url)
        .bind(&platform.join_steps)
        .bind(platform.created_at)
        .bind(platform.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PlatformDbModel>> {
        let platform =
            sqlx::query_as::<_, PlatformDbModel>("SELECT * FROM platforms WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(platform)
    }

    async fn list(&self) -> Result<Vec<PlatformDbModel>> {
        let platforms = sqlx::query_as::<_, PlatformDbModel>("SELECT * FROM platforms")
            .fetch_all(&self.pool)
            .await?;
        Ok(platforms)
    }

    async fn update(&self, platform: &PlatformDbModel) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE platforms SET
                name = ?,
                description = ?,
                niches = ?,
                commission_rate = ?,
                api_url = ?,
                join_steps = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&platform.name)
        .bind(&platform.description)
        .bind(&platform.niches)
        .bind(&platform.commission_rate)
        .bind(&platform.api_url)
        .bind(&platform.join_steps)
        .bind(platform.updated_at)
        .bind(&platform.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM platforms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
