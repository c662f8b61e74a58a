//! Affiliate link repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::AffiliateLinkDbModel;

#[async_trait]
pub trait AffiliateLinkRepository: Send + Sync {
    async fn create(&self, link: &AffiliateLinkDbModel) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<AffiliateLinkDbModel>>;

    /// List every link in storage order.
    async fn list(&self) -> Result<Vec<AffiliateLinkDbModel>>;
}

/// SQLx implementation of AffiliateLinkRepository.
pub struct SqlxAffiliateLinkRepository {
    pool: SqlitePool,
}

impl SqlxAffiliateLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AffiliateLinkRepository for SqlxAffiliateLinkRepository {
    async fn create(&self, link: &AffiliateLinkDbModel) -> Result<()> {
        sqlx::query(
            "INSERT INTO affiliate_links (id, url, platform_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&link.id)
        .bind(&link.url)
        .bind(&link.platform_id)
        .bind(link.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AffiliateLinkDbModel>> {
        let link = sqlx::query_as::<_, AffiliateLinkDbModel>(
            "SELECT * FROM affiliate_links WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn list(&self) -> Result<Vec<AffiliateLinkDbModel>> {
        let links = sqlx::query_as::<_, AffiliateLinkDbModel>("SELECT * FROM affiliate_links")
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{init_pool_with_size, run_migrations};

    #[tokio::test]
    async fn test_dangling_platform_reference_is_stored() {
        let pool = init_pool_with_size("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqlxAffiliateLinkRepository::new(pool);

        let link = AffiliateLinkDbModel::new("https://example.com/ref?id=7", "no-such-platform");
        repo.create(&link).await.unwrap();

        let stored = repo.find_by_id(&link.id).await.unwrap().unwrap();
        assert_eq!(stored.platform_id, "no-such-platform");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
