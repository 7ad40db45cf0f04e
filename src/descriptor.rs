use crate::error::{RestError, Result};
use crate::headers::Headers;
use crate::method::HttpMethod;
use crate::multipart::{FieldValue, FilePart, MultipartBody};
use chrono::{DateTime, Utc};
use crate::template::placeholders;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// EndpointDescriptor is the declarative template of one HTTP operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// HTTP method, or `FORMDATA` for multipart uploads
    pub method: HttpMethod,

    /// Path template with `:name` placeholders
    pub endpoint: String,

    /// Names filled into the template and removed from the body/query
    #[serde(default)]
    pub params: Vec<String>,

    /// Headers added on top of the resource headers
    #[serde(default)]
    pub headers: Headers,

    /// Request fields overlaid on every call
    #[serde(skip)]
    pub options: RequestOptions,

    /// Resolve calls to the full response envelope instead of the body
    #[serde(default)]
    pub raw: bool,
}

impl EndpointDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        EndpointDescriptor {
            method,
            endpoint: endpoint.into(),
            params: Vec::new(),
            headers: Headers::new(),
            options: RequestOptions::default(),
            raw: false,
        }
    }

    /// Add a URL parameter name
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Add a static header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the static request options
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve calls to the full response envelope
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Check that `params` and the template's placeholders name the same things
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| RestError::InvalidDescriptor {
            endpoint: self.endpoint.clone(),
            reason,
        };

        for param in &self.params {
            if !self.endpoint.contains(&format!(":{}", param)) {
                return Err(invalid(format!("parameter {} does not appear in the template", param)));
            }
        }
        for name in placeholders(&self.endpoint) {
            if !self.params.iter().any(|p| p == name) {
                return Err(invalid(format!("placeholder :{} is not listed in params", name)));
            }
        }
        Ok(())
    }
}

/// Request fields that overlay a computed request. A `Some` field replaces the
/// computed value; `headers` replaces the whole header map.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<Headers>,
    pub params: Option<Map<String, Value>>,
    pub data: Option<Body>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn data(mut self, data: Body) -> Self {
        self.data = Some(data);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overlay these options onto a request, field by field
    pub fn apply_to(&self, request: &mut RequestDescriptor) {
        if let Some(method) = self.method {
            request.method = method;
        }
        if let Some(ref url) = self.url {
            request.url = url.clone();
        }
        if let Some(ref headers) = self.headers {
            request.headers = headers.clone();
        }
        if let Some(ref params) = self.params {
            request.params = Some(params.clone());
        }
        if let Some(ref data) = self.data {
            request.data = Some(data.clone());
        }
        if let Some(ref base_url) = self.base_url {
            request.base_url = Some(base_url.clone());
        }
        if let Some(timeout) = self.timeout {
            request.timeout = Some(timeout);
        }
    }
}

/// Call-time override: headers merged into the computed ones plus request
/// fields that replace computed ones.
#[derive(Debug, Clone, Default)]
pub struct CallOverride {
    pub add_headers: Headers,
    pub options: RequestOptions,
}

impl CallOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a header into the computed headers
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Data supplied with a call: JSON fields, and file parts for multipart endpoints.
#[derive(Debug, Clone, Default)]
pub struct CallData {
    pub fields: Map<String, Value>,
    pub files: IndexMap<String, FilePart>,

    /// Typed fields such as dates; they win over a same-named entry of `fields`
    /// and never fill URL parameters
    pub form_fields: IndexMap<String, FieldValue>,
}

impl CallData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.form_fields.insert(name.into(), value.into());
        self
    }

    /// Date field, sent as ISO-8601 UTC with milliseconds
    pub fn date(self, name: impl Into<String>, date: DateTime<Utc>) -> Self {
        self.form_field(name, date)
    }
}

impl From<Value> for CallData {
    /// Objects become fields; any other value carries no fields.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => CallData {
                fields,
                ..Default::default()
            },
            _ => CallData::default(),
        }
    }
}

impl From<Map<String, Value>> for CallData {
    fn from(fields: Map<String, Value>) -> Self {
        CallData {
            fields,
            ..Default::default()
        }
    }
}

impl From<()> for CallData {
    fn from(_: ()) -> Self {
        CallData::default()
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON unless the Content-Type says form-urlencoded
    Json(Value),
    /// Already form-urlencoded
    Form(String),
    Multipart(MultipartBody),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A fully assembled request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Resolved path, or an absolute URL
    pub url: String,
    pub headers: Headers,
    /// Query parameters
    pub params: Option<Map<String, Value>>,
    pub data: Option<Body>,
    /// Overrides the requester's host for this request
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        RequestDescriptor {
            method,
            url: url.into(),
            headers: Headers::new(),
            params: None,
            data: None,
            base_url: None,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate() {
        let ok = EndpointDescriptor::new(HttpMethod::Get, "posts/:id/comments").param("id");
        assert!(ok.validate().is_ok());

        let extra = EndpointDescriptor::new(HttpMethod::Get, "posts").param("id");
        assert!(matches!(extra.validate(), Err(RestError::InvalidDescriptor { .. })));

        let unlisted = EndpointDescriptor::new(HttpMethod::Get, "posts/:id");
        let err = unlisted.validate().unwrap_err();
        assert!(err.to_string().contains(":id is not listed"));
    }

    #[test]
    fn test_descriptor_deserialization() {
        let descriptors: IndexMap<String, EndpointDescriptor> = serde_json::from_value(json!({
            "getById": {"method": "get", "endpoint": "posts/:id", "params": ["id"]},
            "upload": {"method": "FORMDATA", "endpoint": "files", "headers": {"X-Kind": "doc"}, "raw": true}
        }))
        .unwrap();

        let by_id = &descriptors["getById"];
        assert_eq!(by_id.method, HttpMethod::Get);
        assert_eq!(by_id.params, vec!["id".to_string()]);
        assert!(!by_id.raw);

        let upload = &descriptors["upload"];
        assert!(upload.method.is_form_data());
        assert_eq!(upload.headers["X-Kind"], "doc");
        assert!(upload.raw);
    }

    #[test]
    fn test_options_overlay() {
        let mut request = RequestDescriptor::new(HttpMethod::Get, "posts");
        request.params = Some(Map::new());

        RequestOptions::new()
            .url("articles")
            .timeout(Duration::from_secs(5))
            .apply_to(&mut request);

        assert_eq!(request.url, "articles");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.params, Some(Map::new()));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_call_data_from_value() {
        let data = CallData::from(json!({"id": 1}));
        assert_eq!(data.fields["id"], 1);
        assert!(CallData::from(json!(null)).fields.is_empty());
    }
}
