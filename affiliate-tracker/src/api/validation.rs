//! Declarative request validation.
//!
//! Every write route owns a static [`Schema`]: a list of field rules evaluated
//! against the raw JSON body before any handler logic runs. All failing fields
//! are reported together as a list of [`FieldViolation`]s.

use std::sync::LazyLock;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::error::ApiError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").expect("url pattern"));

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    /// Request field the rule applies to (`body` for whole-payload problems)
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Shape predicate applied to a present, non-null field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// String with at least one non-whitespace character.
    NonEmpty,
    /// Any string.
    Text,
    Email,
    /// String of at least this many characters.
    MinLength(usize),
    /// `http`, `https` or `ftp` URL with a non-space body.
    Url,
    /// JSON integer representable as i64.
    Integer,
    /// Array whose items are all strings.
    StringList,
}

impl Check {
    fn apply(self, field: &str, value: &Value) -> Result<(), String> {
        match self {
            Check::Text => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| format!("{field} must be a string")),
            Check::NonEmpty => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                Some(_) => Err(format!("{field} must not be empty")),
                None => Err(format!("{field} must be a string")),
            },
            Check::Email => match value.as_str() {
                Some(s) if EMAIL_RE.is_match(s.trim()) => Ok(()),
                _ => Err("Please include a valid email".to_string()),
            },
            Check::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() >= min => Ok(()),
                _ => Err(format!("{field} must be at least {min} characters")),
            },
            Check::Url => match value.as_str() {
                Some(s) if URL_RE.is_match(s) => Ok(()),
                _ => Err(format!("{field} must be a valid URL (http, https or ftp)")),
            },
            Check::Integer => value
                .as_i64()
                .map(|_| ())
                .ok_or_else(|| format!("{field} must be an integer")),
            Check::StringList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(()),
                _ => Err(format!("{field} must be an array of strings")),
            },
        }
    }
}

/// Rule for one field: presence requirement plus ordered shape checks.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub checks: &'static [Check],
}

impl FieldRule {
    pub const fn required(field: &'static str, checks: &'static [Check]) -> Self {
        Self {
            field,
            required: true,
            checks,
        }
    }

    pub const fn optional(field: &'static str, checks: &'static [Check]) -> Self {
        Self {
            field,
            required: false,
            checks,
        }
    }

    /// First failure for this field, if any. A null value counts as absent.
    fn evaluate(&self, body: &serde_json::Map<String, Value>) -> Option<FieldViolation> {
        let value = body.get(self.field).filter(|v| !v.is_null());
        let Some(value) = value else {
            return self
                .required
                .then(|| FieldViolation::new(self.field, format!("{} is required", self.field)));
        };

        self.checks
            .iter()
            .find_map(|check| check.apply(self.field, value).err())
            .map(|message| FieldViolation::new(self.field, message))
    }
}

/// Ordered set of field rules for one request body.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub rules: &'static [FieldRule],
}

impl Schema {
    /// Evaluate every rule; report all failing fields in rule order.
    pub fn validate(&self, body: &Value) -> Result<(), Vec<FieldViolation>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldViolation::new(
                "body",
                "Request body must be a JSON object",
            )]);
        };

        let violations: Vec<FieldViolation> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(object))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub static REGISTER: Schema = Schema {
    rules: &[
        FieldRule::required("name", &[Check::NonEmpty]),
        FieldRule::required("email", &[Check::Email]),
        FieldRule::required("password", &[Check::MinLength(MIN_PASSWORD_LENGTH)]),
    ],
};

pub static LOGIN: Schema = Schema {
    rules: &[
        FieldRule::required("email", &[Check::Email]),
        FieldRule::required("password", &[Check::NonEmpty]),
    ],
};

pub static CREATE_PLATFORM: Schema = Schema {
    rules: &[
        FieldRule::required("name", &[Check::NonEmpty]),
        FieldRule::required("description", &[Check::NonEmpty]),
        FieldRule::optional("niches", &[Check::StringList]),
        FieldRule::optional("commissionRate", &[Check::Text]),
        FieldRule::optional("apiUrl", &[Check::Text]),
        FieldRule::optional("joinSteps", &[Check::StringList]),
    ],
};

pub static UPDATE_PLATFORM: Schema = Schema {
    rules: &[
        FieldRule::optional("name", &[Check::NonEmpty]),
        FieldRule::optional("description", &[Check::NonEmpty]),
        FieldRule::optional("niches", &[Check::StringList]),
        FieldRule::optional("commissionRate", &[Check::Text]),
        FieldRule::optional("apiUrl", &[Check::Text]),
        FieldRule::optional("joinSteps", &[Check::StringList]),
    ],
};

pub static CREATE_AFFILIATE_LINK: Schema = Schema {
    rules: &[
        FieldRule::required("url", &[Check::Url]),
        FieldRule::required("platformId", &[Check::NonEmpty]),
    ],
};

pub static RECORD_METRIC: Schema = Schema {
    rules: &[
        FieldRule::required("affiliateLinkId", &[Check::NonEmpty]),
        FieldRule::required("clicks", &[Check::Integer]),
        FieldRule::required("conversions", &[Check::Integer]),
    ],
};

/// Associates a request DTO with the schema its raw body must satisfy.
pub trait RequestSchema {
    fn schema() -> &'static Schema;

    /// Re-check an already-typed request, for callers that bypass the extractor.
    fn check(&self) -> Result<(), Vec<FieldViolation>>
    where
        Self: Serialize,
    {
        let value = serde_json::to_value(self)
            .map_err(|e| vec![FieldViolation::new("body", e.to_string())])?;
        Self::schema().validate(&value)
    }
}

/// JSON body extractor that runs the DTO's schema before deserializing.
///
/// An empty body is treated as `{}` so that missing fields are reported
/// individually rather than as a parse failure.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + RequestSchema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::new(e.status(), "Request body too large"),
                _ => ApiError::validation(vec![FieldViolation::new("body", e.body_text())]),
            })?;

        let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(&bytes).map_err(|_| {
                ApiError::validation(vec![FieldViolation::new("body", "Malformed JSON body")])
            })?
        };

        T::schema().validate(&value).map_err(ApiError::validation)?;

        serde_json::from_value(value)
            .map(Validated)
            .map_err(|e| ApiError::validation(vec![FieldViolation::new("body", e.to_string())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(result: Result<(), Vec<FieldViolation>>) -> Vec<String> {
        result
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.field)
            .collect()
    }

    #[test]
    fn test_register_accepts_valid_body() {
        let body = json!({"name": "Ann", "email": "ann@example.com", "password": "secret"});
        assert!(REGISTER.validate(&body).is_ok());
    }

    #[test]
    fn test_register_short_password() {
        let body = json!({"name": "Ann", "email": "ann@example.com", "password": "12345"});
        let err = REGISTER.validate(&body).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].field, "password");
        assert_eq!(err[0].message, "password must be at least 6 characters");
    }

    #[test]
    fn test_all_failures_reported_in_rule_order() {
        let body = json!({"email": "not-an-email"});
        assert_eq!(
            fields(REGISTER.validate(&body)),
            vec!["name", "email", "password"]
        );
    }

    #[test]
    fn test_null_counts_as_missing() {
        let body = json!({"name": null, "description": "d"});
        let err = CREATE_PLATFORM.validate(&body).unwrap_err();
        assert_eq!(err[0].message, "name is required");
    }

    #[test]
    fn test_blank_name_rejected() {
        let body = json!({"name": "   ", "description": "d"});
        assert_eq!(fields(CREATE_PLATFORM.validate(&body)), vec!["name"]);
    }

    #[test]
    fn test_platform_lists_must_hold_strings() {
        let body = json!({"name": "n", "description": "d", "niches": ["a", 1]});
        assert_eq!(fields(CREATE_PLATFORM.validate(&body)), vec!["niches"]);
    }

    #[test]
    fn test_url_shapes() {
        for ok in ["http://a.com", "https://example.com/x?y=1", "ftp://files.example.org"] {
            let body = json!({"url": ok, "platformId": "p"});
            assert!(CREATE_AFFILIATE_LINK.validate(&body).is_ok(), "{ok}");
        }
        for bad in ["notaurl", "mailto:a@b.c", "http://", "https:// spaced.com"] {
            let body = json!({"url": bad, "platformId": "p"});
            assert_eq!(fields(CREATE_AFFILIATE_LINK.validate(&body)), vec!["url"], "{bad}");
        }
    }

    #[test]
    fn test_metric_counts_must_be_integers() {
        let body = json!({"affiliateLinkId": "l", "clicks": "10", "conversions": 1.5});
        assert_eq!(
            fields(RECORD_METRIC.validate(&body)),
            vec!["clicks", "conversions"]
        );

        let body = json!({"affiliateLinkId": "l", "clicks": -3, "conversions": 0});
        assert!(RECORD_METRIC.validate(&body).is_ok());
    }

    #[test]
    fn test_non_object_body() {
        let err = LOGIN.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err, vec![FieldViolation::new("body", "Request body must be a JSON object")]);
    }

    #[test]
    fn test_update_allows_empty_patch() {
        assert!(UPDATE_PLATFORM.validate(&json!({})).is_ok());
    }
}
