use crate::builder::encode_form_body;
use crate::client::{create_rest_client, Config};
use crate::descriptor::{Body, EndpointDescriptor, RequestDescriptor};
use crate::encode::{to_query_string, X_WWW_FORM_URLENCODED};
use crate::error::{RestError, Result};
use crate::headers::{self, Headers, MultiHeaders};
use crate::hooks::{ErrorHook, RequestHook, ResponseHook};
use crate::resource::{create_resource, Resource};
use crate::response::{RawResponse, Reply};
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Per-request flags
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMeta {
    /// Resolve to the full response envelope instead of the body
    pub is_raw: bool,
}

/// Requester holds the configuration shared by every resource created from it:
/// base host, default headers, auth token and hooks.
///
/// Cloning is cheap; clones share the connection pool and hooks.
#[derive(Clone)]
pub struct Requester {
    /// HTTP client
    client: Client,
    /// Configuration
    pub config: Config,
    /// `Accept: application/json` merged with the configured headers
    headers: Headers,
    request_hook: Option<Arc<dyn RequestHook>>,
    response_hook: Option<Arc<dyn ResponseHook>>,
    error_hook: Option<Arc<dyn ErrorHook>>,
}

impl Requester {
    /// Create a requester for the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = create_rest_client(&config)?;

        let mut defaults = Headers::new();
        defaults.insert("Accept".to_string(), "application/json".to_string());
        let headers = headers::merge([&defaults, &config.headers]);

        Ok(Requester {
            client,
            config,
            headers,
            request_hook: None,
            response_hook: None,
            error_hook: None,
        })
    }

    /// Set the hook run before each request is sent
    pub fn with_request_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.request_hook = Some(Arc::new(hook));
        self
    }

    /// Set the hook run on each successful response
    pub fn with_response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    /// Set the hook run on each failed request
    pub fn with_error_hook(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    /// Default headers every resource starts from
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Direct access to the underlying HTTP client
    pub fn raw_client(&self) -> &Client {
        &self.client
    }

    /// Create a resource named `name`, with the built-in operations plus the
    /// given custom endpoints. `source_headers` are merged over the defaults.
    pub fn source(
        &self,
        name: &str,
        custom_endpoints: IndexMap<String, EndpointDescriptor>,
        source_headers: Headers,
    ) -> Result<Resource> {
        let headers = headers::merge([&self.headers, &source_headers]);
        create_resource(self.clone(), name, custom_endpoints, headers)
    }

    /// Send a request and resolve to its body, or to the full response when
    /// `meta.is_raw` is set.
    ///
    /// Failures go through the error hook when one is set; it may recover them.
    pub async fn request(&self, request: RequestDescriptor, meta: RequestMeta) -> Result<Reply> {
        let response = match self.execute(request).await {
            Ok(response) => match self.response_hook {
                Some(ref hook) => hook.after_fetch(response)?,
                None => response,
            },
            Err(error) => match self.error_hook {
                Some(ref hook) => hook.on_request_error(error)?,
                None => return Err(error),
            },
        };

        if meta.is_raw {
            Ok(Reply::Raw(response))
        } else {
            Ok(Reply::Body(response.data))
        }
    }

    async fn execute(&self, mut request: RequestDescriptor) -> Result<RawResponse> {
        self.apply_defaults(&mut request)?;

        let mut request = match self.request_hook {
            Some(ref hook) => hook.before_fetch(request)?,
            None => request,
        };
        // the hook may have switched the Content-Type
        encode_form_body(&mut request)?;

        let url = self.request_url(&request)?;
        let method = request.method;

        let mut builder = self.client.request(method.to_reqwest(), url.as_str());

        let is_multipart = matches!(request.data, Some(Body::Multipart(_)));
        builder = builder.headers(header_map(&request.headers, is_multipart)?);

        builder = match request.data {
            Some(Body::Json(ref value)) => builder.body(serde_json::to_vec(value)?),
            Some(Body::Form(ref encoded)) => builder.body(encoded.clone()),
            Some(Body::Multipart(ref body)) => builder.multipart(body.clone().into_form()?),
            None => builder,
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let start = Instant::now();
        tracing::debug!(%method, url = %url, "sending request");

        let http_response = builder.send().await?;
        let status = http_response.status();
        let response_headers = collect_headers(http_response.headers());
        let body = http_response.bytes().await?;

        tracing::debug!(
            %method,
            url = %url,
            status = status.as_u16(),
            elapsed = ?start.elapsed(),
            "request completed"
        );

        let response = RawResponse::from_parts(status.as_u16(), response_headers, &body);
        if !response.is_success() {
            return Err(RestError::from_response(response));
        }
        Ok(response)
    }

    /// Fill in the Authorization and Content-Type headers the request left unset
    fn apply_defaults(&self, request: &mut RequestDescriptor) -> Result<()> {
        if let Some(ref token) = self.config.auth_token {
            if headers::get(&request.headers, "Authorization").is_none() {
                headers::set(&mut request.headers, "Authorization", &token.header_value());
            }
        }

        let has_content_type = headers::get(&request.headers, "Content-Type").is_some();
        if matches!(request.data, Some(Body::Json(_))) {
            if !has_content_type {
                let content_type = if request.method.places_body() {
                    self.config.body_content_type.clone()
                } else {
                    "application/json".to_string()
                };
                headers::set(&mut request.headers, "Content-Type", &content_type);
            }
            encode_form_body(request)?;
        } else if matches!(request.data, Some(Body::Form(_))) && !has_content_type {
            headers::set(&mut request.headers, "Content-Type", X_WWW_FORM_URLENCODED);
        }
        Ok(())
    }

    fn request_url(&self, request: &RequestDescriptor) -> Result<Url> {
        let base = request.base_url.as_deref().unwrap_or(&self.config.host);
        let mut url = Url::parse(&Config::join_url(base, &request.url))?;

        if let Some(ref params) = request.params {
            let present: Map<String, Value> = params
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let query = to_query_string(&Value::Object(present))?;
            if !query.is_empty() {
                let combined = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
                    _ => query,
                };
                url.set_query(Some(&combined));
            }
        }
        Ok(url)
    }
}

fn header_map(headers: &Headers, is_multipart: bool) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RestError::Header(format!("{}: {}", name, e)))?;
        // reqwest sets the multipart Content-Type with its boundary
        if is_multipart && name == CONTENT_TYPE {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| RestError::Header(format!("{}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn collect_headers(map: &HeaderMap) -> MultiHeaders {
    let mut headers = MultiHeaders::new();
    for (name, value) in map {
        let value = match value.to_str() {
            Ok(value) => value.to_string(),
            Err(_) => {
                tracing::debug!(header = %name, "non UTF-8 response header value, decoding lossily");
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            }
        };
        headers.entry(name.as_str().to_string()).or_default().push(value);
    }
    headers
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("config", &self.config)
            .field("headers", &self.headers)
            .field("request_hook", &self.request_hook.is_some())
            .field("response_hook", &self.response_hook.is_some())
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;
    use crate::token::Token;
    use serde_json::json;

    fn requester(config: Config) -> Requester {
        Requester::new(config).unwrap()
    }

    #[test]
    fn test_default_headers() {
        let r = requester(Config::new("https://api.test").with_header("accept", "text/plain").with_header("X-App", "a"));
        assert_eq!(headers::get(r.headers(), "Accept"), Some("text/plain"));
        assert_eq!(headers::get(r.headers(), "X-App"), Some("a"));
    }

    #[test]
    fn test_request_url_with_query() {
        let r = requester(Config::new("https://api.test/v1/"));
        let mut request = RequestDescriptor::new(HttpMethod::Get, "posts?sort=asc");
        request.params = json!({"userId": 1, "tag": ["a", "b"]}).as_object().cloned();

        let url = r.request_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://api.test/v1/posts?sort=asc&userId=1&tag=a&tag=b");

        request.base_url = Some("http://other.test".to_string());
        request.params = None;
        assert_eq!(r.request_url(&request).unwrap().as_str(), "http://other.test/posts?sort=asc");
    }

    #[test]
    fn test_null_query_fields_are_dropped() {
        let r = requester(Config::new("https://api.test"));
        let mut request = RequestDescriptor::new(HttpMethod::Get, "posts");
        request.params = json!({"userId": null, "page": 2}).as_object().cloned();
        assert_eq!(r.request_url(&request).unwrap().as_str(), "https://api.test/posts?page=2");

        request.params = json!({"userId": null}).as_object().cloned();
        assert_eq!(r.request_url(&request).unwrap().as_str(), "https://api.test/posts");
    }

    #[test]
    fn test_collect_headers_keeps_repeats() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        map.insert("x-raw", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let headers = collect_headers(&map);
        assert_eq!(
            headers::get_all(&headers, "Set-Cookie"),
            ["a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT", "b=2"]
        );
        assert_eq!(headers::get_all(&headers, "x-raw"), ["caf\u{fffd}"]);
    }

    #[test]
    fn test_apply_defaults() {
        let r = requester(
            Config::new("https://api.test")
                .with_auth_token(Token::bearer("secret"))
                .with_body_content_type(X_WWW_FORM_URLENCODED),
        );

        let mut post = RequestDescriptor::new(HttpMethod::Post, "posts");
        post.data = Some(Body::Json(json!({"a": 1})));
        r.apply_defaults(&mut post).unwrap();
        assert_eq!(headers::get(&post.headers, "authorization"), Some("Bearer secret"));
        assert_eq!(post.data, Some(Body::Form("a=1".to_string())));

        let mut own = RequestDescriptor::new(HttpMethod::Put, "posts/1");
        headers::set(&mut own.headers, "Authorization", "mine");
        headers::set(&mut own.headers, "content-type", "application/json");
        own.data = Some(Body::Json(json!({"a": 1})));
        r.apply_defaults(&mut own).unwrap();
        assert_eq!(headers::get(&own.headers, "Authorization"), Some("mine"));
        assert_eq!(own.data, Some(Body::Json(json!({"a": 1}))));
    }

    #[test]
    fn test_header_map_skips_multipart_content_type() {
        let mut h = Headers::new();
        h.insert("Content-Type".to_string(), "application/json".to_string());
        h.insert("X-A".to_string(), "1".to_string());

        assert_eq!(header_map(&h, false).unwrap().len(), 2);
        let map = header_map(&h, true).unwrap();
        assert!(map.get(CONTENT_TYPE).is_none());
        assert_eq!(map.get("x-a").unwrap(), "1");

        h.insert("Bad Name".to_string(), "x".to_string());
        assert!(matches!(header_map(&h, false), Err(RestError::Header(_))));
    }
}
