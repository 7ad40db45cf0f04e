use crate::headers::{self, MultiHeaders};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RawResponse is the full response envelope of a request: status, headers and
/// the decoded body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers, every value of a repeated header kept in order
    pub headers: MultiHeaders,

    /// Decoded body: JSON when it parses, otherwise the text, `null` when empty
    pub data: Value,

    /// Server-assigned request id, taken from `X-Request-Id`
    #[serde(skip)]
    pub request_id: Option<String>,
}

impl RawResponse {
    /// Build a response from a status, headers and raw body bytes
    pub fn from_parts(status: u16, headers: MultiHeaders, body: &[u8]) -> Self {
        let request_id = headers::get_all(&headers, "X-Request-Id").first().cloned();

        RawResponse {
            status,
            headers,
            data: decode_body(body),
            request_id,
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a response header, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).first().map(|v| v.as_str())
    }

    /// All values of a response header, e.g. each `Set-Cookie`
    pub fn header_all(&self, name: &str) -> &[String] {
        headers::get_all(&self.headers, name)
    }

    /// Deserialize the decoded body
    pub fn apply<T>(&self) -> Result<T, crate::error::RestError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.data.clone()).map_err(|e| e.into())
    }

    /// Walk the body along `a/b/0`-style paths; numeric segments index arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut current = &self.data;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// String at a body path, if the value there is a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

fn decode_body(body: &[u8]) -> Value {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// What a request resolves to: the decoded body, or the full envelope when the
/// endpoint asked for it.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Value),
    Raw(RawResponse),
}

impl Reply {
    /// The decoded body, whichever form the reply took
    pub fn into_body(self) -> Value {
        match self {
            Reply::Body(value) => value,
            Reply::Raw(response) => response.data,
        }
    }

    /// The full envelope, if the request was made raw
    pub fn into_raw(self) -> Option<RawResponse> {
        match self {
            Reply::Raw(response) => Some(response),
            Reply::Body(_) => None,
        }
    }
}
