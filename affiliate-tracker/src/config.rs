//! Process configuration loaded once at startup.
//!
//! Values come from the environment (after `.env` is loaded by `main`).
//! Unparseable numbers fall back to their defaults; a missing `JWT_SECRET`
//! is the only hard failure.

use std::path::PathBuf;

use axum::http::HeaderValue;

use crate::api::auth_service::AuthConfig;
use crate::api::server::ApiServerConfig;
use crate::rate_limiter::RateLimitConfig;
use crate::{Error, Result};

/// Default SQLite database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:affiliate.db?mode=rwc";
/// Default `iss` claim for issued tokens.
pub const DEFAULT_JWT_ISSUER: &str = "affiliate-tracker";
/// Default `aud` claim for issued tokens.
pub const DEFAULT_JWT_AUDIENCE: &str = "affiliate-tracker-api";

/// Token signing settings.
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Directory for the daily rolling log file; console only when unset.
    pub dir: Option<PathBuf>,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtSettings,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub server: ApiServerConfig,
    /// Reject links and metrics whose parent does not exist.
    pub strict_referential_integrity: bool,
    pub log: LogSettings,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` (default: `sqlite:affiliate.db?mode=rwc`)
    /// - `JWT_SECRET` (required)
    /// - `JWT_ISSUER`, `JWT_AUDIENCE`
    /// - `STRICT_REFERENTIAL_INTEGRITY` (default: false)
    /// - `LOG_DIR`, `LOG_FORMAT` (`json` or text)
    ///
    /// Server, auth and rate-limit variables are read by their own `from_env`.
    pub fn from_env() -> Result<Self> {
        let secret = non_empty_var("JWT_SECRET")
            .ok_or_else(|| Error::config("JWT_SECRET must be set"))?;

        let server = ApiServerConfig::from_env_or_default();
        if let Some(origin) = &server.cors_origin
            && HeaderValue::from_str(origin).is_err()
        {
            return Err(Error::config(format!("CORS_ORIGIN is not a valid origin: {origin}")));
        }

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt: JwtSettings {
                secret,
                issuer: non_empty_var("JWT_ISSUER")
                    .unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
                audience: non_empty_var("JWT_AUDIENCE")
                    .unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string()),
            },
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::from_env(),
            server,
            strict_referential_integrity: env_flag("STRICT_REFERENTIAL_INTEGRITY"),
            log: LogSettings {
                dir: non_empty_var("LOG_DIR").map(PathBuf::from),
                json: non_empty_var("LOG_FORMAT")
                    .is_some_and(|format| format.eq_ignore_ascii_case("json")),
            },
        })
    }

    /// Configuration for tests and embedding: in-memory database, default limits.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt: JwtSettings {
                secret: secret.into(),
                issuer: DEFAULT_JWT_ISSUER.to_string(),
                audience: DEFAULT_JWT_AUDIENCE.to_string(),
            },
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            server: ApiServerConfig::default(),
            strict_referential_integrity: false,
            log: LogSettings::default(),
        }
    }
}

/// Read a variable, treating blank values as unset.
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a boolean flag; `1`, `true`, `yes` and `on` enable it.
pub(crate) fn env_flag(name: &str) -> bool {
    non_empty_var(name).is_some_and(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        for on in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_flag(on), "{on} should enable");
        }
        for off in ["0", "false", "no", "", "enabled"] {
            assert!(!parse_flag(off), "{off} should not enable");
        }
    }

    #[test]
    fn test_with_secret_defaults() {
        let config = AppConfig::with_secret("s3cret");
        assert_eq!(config.jwt.issuer, DEFAULT_JWT_ISSUER);
        assert_eq!(config.jwt.audience, DEFAULT_JWT_AUDIENCE);
        assert_eq!(config.auth.access_token_expiration_secs, 3600);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert!(!config.strict_referential_integrity);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::with_secret("do-not-print");
        let debug = format!("{config:?}");
        assert!(!debug.contains("do-not-print"));
        assert!(debug.contains("[REDACTED]"));
    }
}
