//! JSON column helpers with consistent warning logs.
//!
//! List attributes are stored as JSON text; a corrupt column degrades to the
//! default value with a warning instead of failing the whole read.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Identifies the column being (de)serialized for log context.
#[derive(Debug, Clone, Copy)]
pub struct JsonContext<'a> {
    pub entity: &'static str,
    pub id: &'a str,
    pub field: &'static str,
}

impl<'a> JsonContext<'a> {
    pub fn platform(id: &'a str, field: &'static str) -> Self {
        Self {
            entity: "platform",
            id,
            field,
        }
    }
}

/// Parse a JSON column, falling back to `T::default()` on empty or invalid input.
pub fn parse_or_default<T: DeserializeOwned + Default>(
    raw: &str,
    ctx: JsonContext<'_>,
    msg: &'static str,
) -> T {
    if raw.is_empty() {
        return T::default();
    }
    match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(
                entity = ctx.entity,
                id = %ctx.id,
                field = ctx.field,
                raw_len = raw.len(),
                error = %error,
                "{msg}"
            );
            T::default()
        }
    }
}

/// Serialize a value for a JSON column, storing `fallback` if serialization fails.
pub fn to_string_or_fallback<T: Serialize + ?Sized>(
    value: &T,
    fallback: &'static str,
    ctx: JsonContext<'_>,
    msg: &'static str,
) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(error) => {
            warn!(
                entity = ctx.entity,
                id = %ctx.id,
                field = ctx.field,
                error = %error,
                "{msg}"
            );
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_list() {
        let parsed: Vec<String> = parse_or_default(
            r#"["tech","finance"]"#,
            JsonContext::platform("p1", "niches"),
            "bad",
        );
        assert_eq!(parsed, vec!["tech", "finance"]);
    }

    #[test]
    fn invalid_json_falls_back_to_default() {
        let parsed: Vec<String> =
            parse_or_default("{not json", JsonContext::platform("p1", "niches"), "bad");
        assert!(parsed.is_empty());
    }

    #[test]
    fn empty_string_is_default() {
        let parsed: Vec<String> =
            parse_or_default("", JsonContext::platform("p1", "join_steps"), "bad");
        assert!(parsed.is_empty());
    }

    #[test]
    fn serializes_list() {
        let json = to_string_or_fallback(
            &vec!["a".to_string()],
            "[]",
            JsonContext::platform("p1", "niches"),
            "bad",
        );
        assert_eq!(json, r#"["a"]"#);
    }
}
