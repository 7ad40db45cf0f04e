use crate::error::{RestError, Result};
use crate::template::stringify;
use serde_json::Value;
use url::form_urlencoded;

pub const X_WWW_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Whether a Content-Type header value denotes a form-urlencoded body
pub fn is_form_urlencoded(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .contains(X_WWW_FORM_URLENCODED)
}

/// Serialize an object (or array) into a form-urlencoded string. Nested
/// objects use bracket notation (`a[b]=c`) and arrays repeat their key
/// (`b=2&b=3`).
pub fn to_query_string(value: &Value) -> Result<String> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, v) in map {
                flatten(key, v, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, v) in items.iter().enumerate() {
                flatten(&index.to_string(), v, &mut pairs);
            }
        }
        other => {
            return Err(RestError::Encode(format!(
                "cannot form-encode a bare {} value",
                kind(other)
            )))
        }
    }

    Ok(form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish())
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                flatten(&format!("{}[{}]", prefix, key), v, pairs);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten(prefix, item, pairs);
            }
        }
        Value::Null => pairs.push((prefix.to_string(), String::new())),
        scalar => pairs.push((prefix.to_string(), stringify(scalar))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null => "null",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arrays_repeat_key() {
        let encoded = to_query_string(&json!({"a": 1, "b": [2, 3]})).unwrap();
        assert_eq!(encoded, "a=1&b=2&b=3");
    }

    #[test]
    fn test_nested_objects_use_brackets() {
        let encoded = to_query_string(&json!({"user": {"name": "ana lu", "tags": ["x"]}})).unwrap();
        assert_eq!(encoded, "user%5Bname%5D=ana+lu&user%5Btags%5D=x");
    }

    #[test]
    fn test_null_and_empty() {
        assert_eq!(to_query_string(&json!({"a": null, "b": true})).unwrap(), "a=&b=true");
        assert_eq!(to_query_string(&json!({})).unwrap(), "");
        assert_eq!(to_query_string(&Value::Null).unwrap(), "");
        assert_eq!(to_query_string(&json!(["x", "y"])).unwrap(), "0=x&1=y");
    }

    #[test]
    fn test_bare_scalar_is_an_error() {
        assert!(matches!(to_query_string(&json!(5)), Err(RestError::Encode(_))));
    }

    #[test]
    fn test_content_type_detection() {
        assert!(is_form_urlencoded("application/x-www-form-urlencoded"));
        assert!(is_form_urlencoded("application/x-www-form-urlencoded; charset=UTF-8"));
        assert!(!is_form_urlencoded("application/json"));
    }
}
