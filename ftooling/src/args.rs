//! JSON argument parsing helpers for tool handlers and call descriptors.
//!
//! ```rust
//! use ftooling::{parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"rust"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    let value = parse_json_value(args_json)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

/// Accepts arguments as an object, a JSON-encoded object string, or null.
pub fn arguments_from_value(value: &Value) -> Result<Map<String, Value>, ToolError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::String(raw) if raw.trim().is_empty() => Ok(Map::new()),
        Value::String(raw) => parse_json_object(raw),
        Value::Null => Ok(Map::new()),
        other => Err(ToolError::invalid_arguments(format!(
            "expected object arguments, got {other}"
        ))),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

pub fn required_i64(args: &Map<String, Value>, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required integer: '{key}'")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_object_and_extract_required_string() {
        let args = parse_json_object("{\"query\":\"rust\"}").expect("args should parse");
        let query = required_string(&args, "query").expect("query should exist");
        assert_eq!(query, "rust");
        assert_eq!(optional_string(&args, "page"), None);
    }

    #[test]
    fn parse_invalid_json_returns_invalid_arguments() {
        let error = parse_json_value("{").expect_err("json should fail");
        assert_eq!(error.kind, crate::ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn arguments_accept_encoded_and_inline_objects() {
        let inline = arguments_from_value(&json!({"x": 1})).expect("inline");
        let encoded = arguments_from_value(&json!("{\"x\": 1}")).expect("encoded");
        assert_eq!(inline, encoded);
        assert_eq!(required_i64(&inline, "x").expect("x"), 1);

        assert!(arguments_from_value(&Value::Null).expect("null").is_empty());
        assert!(arguments_from_value(&json!([1, 2])).is_err());
    }
}
