//! User repository for database operations.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::{UserDbModel, normalize_email};
use crate::{Error, Result};

/// User repository trait for credential store access.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user.
    ///
    /// Fails with [`Error::AlreadyExists`] when the email is already taken.
    async fn create(&self, user: &UserDbModel) -> Result<()>;

    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserDbModel>>;

    /// Find a user by email address (normalized before lookup).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDbModel>>;

    /// Count total number of users.
    async fn count(&self) -> Result<i64>;
}

/// SQLx implementation of UserRepository.
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SqlxUserRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &UserDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_unique_violation(e, "User", "email"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn count(&self) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{init_pool_with_size, run_migrations};

    async fn setup() -> SqlxUserRepository {
        let pool = init_pool_with_size("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqlxUserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = setup().await;
        let user = UserDbModel::new("Alice", "alice@example.com", "hash");
        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = repo.find_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = setup().await;
        repo.create(&UserDbModel::new("A", "dup@example.com", "h1"))
            .await
            .unwrap();

        let err = repo
            .create(&UserDbModel::new("B", "Dup@Example.com", "h2"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let repo = setup().await;
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }
}
