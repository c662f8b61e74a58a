//! JWT session tokens.
//!
//! Tokens are HS256-signed and carry the user id and role. Verification is a
//! pure function of the secret, the token and the supplied clock reading.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Role stored on the user record
    pub role: String,
    /// Token issuer
    pub iss: String,
    /// Token audience
    pub aud: String,
    /// Expiration timestamp (Unix seconds)
    pub exp: u64,
    /// Issued at timestamp (Unix seconds)
    pub iat: u64,
}

/// JWT service error types.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
    #[error("Token validation failed: {0}")]
    TokenValidation(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
}

/// JWT service for token generation and validation.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiration_secs: u64,
}

impl JwtService {
    /// Create a new JWT service.
    ///
    /// # Arguments
    /// * `secret` - The secret key for signing tokens
    /// * `issuer` - The token issuer claim
    /// * `audience` - The token audience claim
    /// * `expiration_secs` - Token lifetime in seconds (default: 3600)
    pub fn new(secret: &str, issuer: &str, audience: &str, expiration_secs: Option<u64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiration_secs: expiration_secs.unwrap_or(3600),
        }
    }

    fn unix_now() -> Result<u64, JwtError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Generate a token for a user, issued now.
    pub fn generate_token(&self, user_id: &str, role: &str) -> Result<String, JwtError> {
        self.generate_token_at(user_id, role, Self::unix_now()?)
    }

    /// Generate a token as if issued at `now` (Unix seconds).
    pub fn generate_token_at(&self, user_id: &str, role: &str, now: u64) -> Result<String, JwtError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: now.saturating_add(self.expiration_secs),
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate a token against the system clock.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let now = Self::unix_now().map_err(|e| JwtError::TokenValidation(e.to_string()))?;
        self.validate_token_at(token, now)
    }

    /// Validate a token as of `now` (Unix seconds).
    ///
    /// Signature, issuer and audience are checked by `jsonwebtoken`; expiry is
    /// checked here with no leeway so that a token is valid while `now < exp`.
    pub fn validate_token_at(&self, token: &str, now: u64) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer
                | jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidToken,
                _ => JwtError::TokenValidation(e.to_string()),
            })?;

        if now >= claims.exp {
            return Err(JwtError::TokenExpired);
        }
        Ok(claims)
    }

    /// Get the configured expiration time in seconds.
    pub fn expiration_secs(&self) -> u64 {
        self.expiration_secs
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000;

    fn create_test_service() -> JwtService {
        JwtService::new(
            "test-secret-key-32-chars-long!!",
            "test-issuer",
            "test-audience",
            Some(3600),
        )
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_service();
        let token = service
            .generate_token("user123", "user")
            .expect("Token generation should succeed");

        let claims = service
            .validate_token(&token)
            .expect("Token validation should succeed");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-audience");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_valid_until_expiry() {
        let service = create_test_service();
        let token = service.generate_token_at("u1", "user", T0).unwrap();

        assert!(service.validate_token_at(&token, T0).is_ok());
        assert!(service.validate_token_at(&token, T0 + 3599).is_ok());
        assert!(matches!(
            service.validate_token_at(&token, T0 + 3600),
            Err(JwtError::TokenExpired)
        ));
        assert!(matches!(
            service.validate_token_at(&token, T0 + 7200),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate_token("invalid.token.here");

        assert!(matches!(
            result,
            Err(JwtError::InvalidToken) | Err(JwtError::TokenValidation(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 =
            JwtService::new("secret1-32-chars-long-key!!!!!", "issuer", "audience", None);
        let service2 =
            JwtService::new("secret2-32-chars-long-key!!!!!", "issuer", "audience", None);

        let token = service1
            .generate_token("user", "user")
            .expect("Token generation should succeed");

        let result = service2.validate_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_wrong_audience() {
        let secret = "shared-secret-32-chars-long!!!!";
        let issuing = JwtService::new(secret, "issuer", "other-api", None);
        let verifying = JwtService::new(secret, "issuer", "audience", None);

        let token = issuing.generate_token("user", "user").unwrap();
        assert!(matches!(
            verifying.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_token_round_trips_claims(
            user_id in "[a-zA-Z0-9_-]{1,50}",
            role in "[a-z]{1,12}",
        ) {
            let service = JwtService::new(
                "test-secret-key-32-chars-long!!",
                "test-issuer",
                "test-audience",
                Some(3600),
            );

            let token = service
                .generate_token(&user_id, &role)
                .expect("Token generation should succeed");

            let claims = service
                .validate_token(&token)
                .expect("Token validation should succeed");

            prop_assert_eq!(&claims.sub, &user_id);
            prop_assert_eq!(&claims.role, &role);
            prop_assert!(claims.exp > claims.iat);
        }

        #[test]
        fn prop_validity_is_a_function_of_elapsed_time(
            issued in 1_000_000u64..2_000_000_000u64,
            elapsed in 0u64..10_000u64,
        ) {
            let service = JwtService::new(
                "test-secret-key-32-chars-long!!",
                "test-issuer",
                "test-audience",
                Some(3600),
            );
            let token = service.generate_token_at("u", "user", issued).unwrap();

            let result = service.validate_token_at(&token, issued + elapsed);
            if elapsed < 3600 {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(JwtError::TokenExpired)));
            }
        }

        #[test]
        fn prop_tampered_token_rejected(
            user_id in "[a-zA-Z0-9_-]{1,50}",
            tamper_char in prop::sample::select(vec!['X', 'Y', 'Z', '0', '1', '2']),
            tamper_pos in 10usize..50usize,
        ) {
            let service = JwtService::new(
                "test-secret-key-32-chars-long!!",
                "test-issuer",
                "test-audience",
                Some(3600),
            );
            let token = service.generate_token(&user_id, "user").unwrap();

            let mut chars: Vec<char> = token.chars().collect();
            if tamper_pos < chars.len() {
                chars[tamper_pos] = tamper_char;
            }
            let tampered: String = chars.into_iter().collect();

            if tampered != token {
                prop_assert!(service.validate_token(&tampered).is_err());
            }
        }
    }
}
