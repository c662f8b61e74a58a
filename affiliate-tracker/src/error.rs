//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseSqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{entity_type} with this {field} already exists")]
    AlreadyExists { entity_type: String, field: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn already_exists(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Map a unique-constraint violation from sqlx into [`Error::AlreadyExists`].
    ///
    /// Any other sqlx error is passed through unchanged.
    pub fn from_unique_violation(
        err: sqlx::Error,
        entity_type: &str,
        field: &str,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::already_exists(entity_type, field)
            }
            _ => Self::DatabaseSqlx(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("Platform", "abc");
        assert_eq!(err.to_string(), "Entity not found: Platform with id abc");
    }

    #[test]
    fn test_already_exists_display() {
        let err = Error::already_exists("User", "email");
        assert_eq!(err.to_string(), "User with this email already exists");
    }

    #[test]
    fn test_non_unique_sqlx_error_passes_through() {
        let err = Error::from_unique_violation(sqlx::Error::RowNotFound, "User", "email");
        assert!(matches!(err, Error::DatabaseSqlx(sqlx::Error::RowNotFound)));
    }
}
