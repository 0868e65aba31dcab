//! BSON parsing utilities for converting between formats.

use mongodb::bson::{self, Bson, Document};
use serde_json::Value;

/// Parse a literal typed by the user into BSON, inferring its type.
///
/// Numbers become `Int32`, `Int64` or `Double` (first that fits), `true`/`false`
/// become booleans, `null` becomes `Null`, anything else stays a string.
pub fn parse_literal(input: &str) -> Bson {
    if let Ok(n) = input.parse::<i32>() {
        return Bson::Int32(n);
    }
    if let Ok(n) = input.parse::<i64>() {
        return Bson::Int64(n);
    }
    if let Ok(n) = input.parse::<f64>()
        && n.is_finite()
        && looks_numeric(input)
    {
        return Bson::Double(n);
    }
    match input {
        "true" => Bson::Boolean(true),
        "false" => Bson::Boolean(false),
        "null" => Bson::Null,
        _ => Bson::String(input.to_string()),
    }
}

// `f64::from_str` also accepts "inf", "NaN" and "infinity".
fn looks_numeric(input: &str) -> bool {
    input.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E'))
}

/// Convert a BSON document to a pretty-printed relaxed Extended JSON string.
pub fn document_to_relaxed_extjson_string(doc: &Document) -> String {
    let value = bson::Bson::Document(doc.clone()).into_relaxed_extjson();
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| format!("{doc:?}"))
}

/// Parse a JSON string into a BSON document.
pub fn parse_document_from_json(input: &str) -> Result<Document, String> {
    let value: Value = serde_json::from_str(input).map_err(|e| e.to_string())?;
    let bson = bson::Bson::try_from(value).map_err(|e| e.to_string())?;
    match bson {
        bson::Bson::Document(doc) => Ok(doc),
        _ => Err("Root JSON must be a document".to_string()),
    }
}

/// Parse an optional query clause (filter, sort, projection).
///
/// Blank input means "no clause".
pub fn parse_optional_document(input: &str) -> Result<Option<Document>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_document_from_json(trimmed).map(Some)
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{Bson, doc};

    use super::*;

    #[test]
    fn literal_inference() {
        assert_eq!(parse_literal("pouet"), Bson::String("pouet".into()));
        assert_eq!(parse_literal("1.1"), Bson::Double(1.1));
        assert_eq!(parse_literal("42"), Bson::Int32(42));
        assert_eq!(parse_literal("9000000000"), Bson::Int64(9_000_000_000));
        assert_eq!(parse_literal("-3e2"), Bson::Double(-300.0));
        assert_eq!(parse_literal("true"), Bson::Boolean(true));
        assert_eq!(parse_literal("false"), Bson::Boolean(false));
        assert_eq!(parse_literal("null"), Bson::Null);
    }

    #[test]
    fn literal_inference_is_case_sensitive() {
        assert_eq!(parse_literal("True"), Bson::String("True".into()));
        assert_eq!(parse_literal("NULL"), Bson::String("NULL".into()));
        assert_eq!(parse_literal("NaN"), Bson::String("NaN".into()));
        assert_eq!(parse_literal("inf"), Bson::String("inf".into()));
        assert_eq!(parse_literal(""), Bson::String(String::new()));
    }

    #[test]
    fn optional_clause_parsing() {
        assert_eq!(parse_optional_document("   "), Ok(None));
        assert_eq!(
            parse_optional_document(r#"{ "name": "alice" }"#),
            Ok(Some(doc! { "name": "alice" }))
        );
        assert!(parse_optional_document("[1, 2]").is_err());
        assert!(parse_optional_document("{ broken").is_err());
    }
}
