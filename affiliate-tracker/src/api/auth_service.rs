//! Authentication service for registration, login and token verification.

use std::sync::Arc;

use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{debug, info, warn};

use crate::Error;
use crate::database::models::UserDbModel;
use crate::database::repositories::UserRepository;

use super::jwt::{Claims, JwtError, JwtService};
use super::models::RegisterRequest;
use super::validation::{FieldViolation, RequestSchema};

/// Session token lifetime: one hour, not configurable.
pub const ACCESS_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Access token expiration in seconds
    pub access_token_expiration_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_expiration_secs: ACCESS_TOKEN_LIFETIME_SECS,
        }
    }
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::TokenGeneration(msg) => AuthError::Internal(msg),
            JwtError::InvalidToken | JwtError::TokenValidation(_) => AuthError::InvalidToken,
        }
    }
}

/// Issued session token.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token expiration in seconds
    pub expires_in: u64,
}

/// Authentication service backed by the credential store.
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService.
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
            config,
        }
    }

    /// Hash a password using Argon2id with OWASP recommended parameters.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        // OWASP recommended parameters: m=19456 (19 MiB), t=2, p=1
        let params = Params::new(19456, 2, 1, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash format: {}", e)))?;

        // Parameters are read back from the PHC string
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Register a new user with the default role.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserDbModel, AuthError> {
        request.check().map_err(AuthError::Validation)?;

        let password_hash = Self::hash_password(&request.password)?;
        let user = UserDbModel::new(request.name.trim(), &request.email, password_hash);

        self.user_repo.create(&user).await.map_err(|e| match e {
            Error::AlreadyExists { .. } => {
                debug!(email = %user.email, "Registration rejected: email taken");
                AuthError::DuplicateEmail
            }
            other => AuthError::Storage(other.to_string()),
        })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(&user.id, &user.role)?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration_secs,
        })
    }

    /// Verify a presented bearer token.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        Ok(self.jwt_service.validate_token(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// In-memory credential store enforcing email uniqueness.
    #[derive(Default)]
    struct MockUserRepository {
        users: Mutex<HashMap<String, UserDbModel>>,
        fail_writes: bool,
    }

    #[async_trait::async_trait]
    impl UserRepository for MockUserRepository {
        async fn create(&self, user: &UserDbModel) -> crate::Result<()> {
            if self.fail_writes {
                return Err(Error::Other("disk full".to_string()));
            }
            let mut users = self.users.lock().await;
            if users.values().any(|u| u.email == user.email) {
                return Err(Error::already_exists("User", "email"));
            }
            users.insert(user.id.clone(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> crate::Result<Option<UserDbModel>> {
            Ok(self.users.lock().await.get(id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> crate::Result<Option<UserDbModel>> {
            let email = crate::database::models::normalize_email(email);
            Ok(self
                .users
                .lock()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn count(&self) -> crate::Result<i64> {
            Ok(self.users.lock().await.len() as i64)
        }
    }

    fn create_service(repo: Arc<MockUserRepository>) -> AuthService {
        let jwt_service = Arc::new(JwtService::new(
            "test-secret-key-32-chars-long!!",
            "test-issuer",
            "test-audience",
            Some(3600),
        ));
        AuthService::new(repo, jwt_service, AuthConfig::default())
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_auth_config_default() {
        assert_eq!(AuthConfig::default().access_token_expiration_secs, 3600);
    }

    #[tokio::test]
    async fn test_login_token_lives_one_hour() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo);
        service
            .register(&register_request("hour@example.com", "secret123"))
            .await
            .unwrap();

        let response = service.login("hour@example.com", "secret123").await.unwrap();
        assert_eq!(response.expires_in, 3600);

        let claims = service.authenticate(Some(&response.token)).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_hash_password() {
        let password = "testpassword123";
        let hash = AuthService::hash_password(password).expect("Hashing should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, password);
    }

    #[test]
    fn test_verify_password() {
        let hash = AuthService::hash_password("testpassword123").unwrap();

        assert!(AuthService::verify_password("testpassword123", &hash).unwrap());
        assert!(!AuthService::verify_password("wrongpassword456", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_stores_hash_and_default_role() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo.clone());

        let user = service
            .register(&register_request("Ann@Example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.role, "user");
        assert_eq!(user.email, "ann@example.com");
        assert_ne!(user.password_hash, "secret1");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_short_password_persists_nothing() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo.clone());

        let err = service
            .register(&register_request("a@example.com", "12345"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(ref v) if v[0].field == "password"));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo.clone());

        service
            .register(&register_request("dup@example.com", "secret1"))
            .await
            .unwrap();
        let err = service
            .register(&register_request("dup@example.com", "secret2"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_storage_failure() {
        let repo = Arc::new(MockUserRepository {
            fail_writes: true,
            ..Default::default()
        });
        let service = create_service(repo);

        let err = service
            .register(&register_request("a@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo);
        let user = service
            .register(&register_request("ann@example.com", "secret1"))
            .await
            .unwrap();

        let response = service.login("ann@example.com", "secret1").await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);

        let claims = service.authenticate(Some(&response.token)).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let repo = Arc::new(MockUserRepository::default());
        let service = create_service(repo);
        service
            .register(&register_request("ann@example.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = service.login("ann@example.com", "nope123").await.unwrap_err();
        let unknown_email = service.login("bob@example.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn test_authenticate_missing_and_invalid() {
        let service = create_service(Arc::new(MockUserRepository::default()));

        assert!(matches!(
            service.authenticate(None),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            service.authenticate(Some("garbage")),
            Err(AuthError::InvalidToken)
        ));
    }
}
