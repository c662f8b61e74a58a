//! User database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role assigned to every newly registered user.
pub const DEFAULT_ROLE: &str = "user";

/// User database model.
/// Represents a registered account in the credential store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique, normalized (trimmed, lower-cased) email address
    pub email: String,
    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role carried in issued tokens
    pub role: String,
    /// Unix epoch milliseconds (UTC) when the user was created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) when the user was last updated.
    pub updated_at: i64,
}

impl UserDbModel {
    /// Create a new user with the default role.
    /// Note: Password should be hashed before calling this.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get created_at as `DateTime<Utc>`.
    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }
}

/// Canonical form used for storing and looking up emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults() {
        let user = UserDbModel::new("Alice", "alice@example.com", "hashed_password");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.created_at, user.updated_at);
        assert!(uuid::Uuid::parse_str(&user.id).is_ok());
    }

    #[test]
    fn test_user_email_is_normalized() {
        let user = UserDbModel::new("Bob", "  Bob@Example.COM ", "hash");
        assert_eq!(user.email, "bob@example.com");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = UserDbModel::new("Carol", "carol@example.com", "$argon2id$secret");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_user_ids_are_unique() {
        let a = UserDbModel::new("Dave", "dave@example.com", "hash");
        let b = UserDbModel::new("Dave", "dave@example.com", "hash");
        assert_ne!(a.id, b.id);
    }
}
