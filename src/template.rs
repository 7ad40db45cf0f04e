use crate::error::{RestError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What to do when a URL parameter has no value in the call data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamPolicy {
    /// Fail the call with `RestError::MissingParam`
    #[default]
    Strict,
    /// Substitute the literal `undefined`
    Lenient,
}

const MISSING: &str = "undefined";

/// Replace `:name` placeholders in `template`.
///
/// Names are taken in `params` order and each replaces only the first remaining
/// occurrence of its placeholder, so a name used twice in the template must be
/// listed twice.
pub fn resolve(
    template: &str,
    params: &[String],
    data: &Map<String, Value>,
    policy: ParamPolicy,
) -> Result<String> {
    let mut url = template.to_string();

    for name in params {
        let value = match data.get(name) {
            Some(value) => stringify(value),
            None => match policy {
                ParamPolicy::Strict => {
                    return Err(RestError::MissingParam {
                        param: name.clone(),
                        endpoint: template.to_string(),
                    })
                }
                ParamPolicy::Lenient => MISSING.to_string(),
            },
        };
        url = url.replacen(&format!(":{}", name), &value, 1);
    }

    Ok(url)
}

/// Names of the placeholders that start a path segment, in template order.
pub fn placeholders(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .map(|rest| {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            &rest[..end]
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// String form of a value as it appears in a URL
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
