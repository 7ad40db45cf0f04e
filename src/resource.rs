use crate::builder::build_request;
use crate::descriptor::{CallData, CallOverride, EndpointDescriptor, RequestDescriptor};
use crate::error::{RestError, Result};
use crate::headers::Headers;
use crate::method::HttpMethod;
use crate::requester::{RequestMeta, Requester};
use crate::response::{RawResponse, Reply};
use indexmap::IndexMap;
use serde_json::Value;

/// Endpoint is one descriptor bound to a requester and the headers of its resource.
#[derive(Debug, Clone)]
pub struct Endpoint {
    descriptor: EndpointDescriptor,
    headers: Headers,
    requester: Requester,
}

impl Endpoint {
    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    /// Build the request a call would send, without sending it
    pub fn build(&self, data: &CallData, call: &CallOverride) -> Result<RequestDescriptor> {
        build_request(
            &self.descriptor,
            &self.headers,
            data,
            call,
            self.requester.config.param_policy,
        )
    }

    /// Send a call. Resolves to the body, or to the full response for raw endpoints.
    pub async fn call(&self, data: impl Into<CallData>, call: CallOverride) -> Result<Reply> {
        let request = self.build(&data.into(), &call)?;
        let meta = RequestMeta {
            is_raw: self.descriptor.raw,
        };
        self.requester.request(request, meta).await
    }

    /// Send a call and unmarshal the response body into the target type
    pub async fn apply<T>(&self, data: impl Into<CallData>, call: CallOverride) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.call(data, call).await?.into_body();
        Ok(serde_json::from_value(body)?)
    }

    /// Send a call and return the full response, whatever the endpoint's raw flag
    pub async fn do_request(&self, data: impl Into<CallData>, call: CallOverride) -> Result<RawResponse> {
        let request = self.build(&data.into(), &call)?;
        self.requester
            .request(request, RequestMeta { is_raw: true })
            .await?
            .into_raw()
            .ok_or_else(|| RestError::Other("raw request resolved without a response".to_string()))
    }
}

/// Resource is a named set of endpoints sharing a base path and headers.
///
/// Every resource has `get`, `post`, `update` and `remove`; custom endpoints
/// are added under their own names and replace built-ins of the same name.
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    endpoints: IndexMap<String, Endpoint>,
}

/// Bind the built-in and custom endpoints of a resource.
///
/// Custom descriptors are validated here, so a template and its params that do
/// not agree fail at setup rather than on the first call.
pub fn create_resource(
    requester: Requester,
    name: &str,
    custom_endpoints: IndexMap<String, EndpointDescriptor>,
    headers: Headers,
) -> Result<Resource> {
    let with_id = format!("{}/:id", name);
    let builtins = [
        ("get", EndpointDescriptor::new(HttpMethod::Get, name)),
        ("post", EndpointDescriptor::new(HttpMethod::Post, name)),
        ("update", EndpointDescriptor::new(HttpMethod::Put, with_id.as_str()).param("id")),
        ("remove", EndpointDescriptor::new(HttpMethod::Delete, with_id.as_str()).param("id")),
    ];

    let mut endpoints = IndexMap::new();
    let bind = |descriptor: EndpointDescriptor| Endpoint {
        descriptor,
        headers: headers.clone(),
        requester: requester.clone(),
    };

    for (key, descriptor) in builtins {
        endpoints.insert(key.to_string(), bind(descriptor));
    }
    for (key, descriptor) in custom_endpoints {
        descriptor.validate()?;
        endpoints.insert(key, bind(descriptor));
    }

    tracing::trace!(resource = name, endpoints = endpoints.len(), "created resource");

    Ok(Resource {
        name: name.to_string(),
        endpoints,
    })
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a bound endpoint
    pub fn endpoint(&self, key: &str) -> Option<&Endpoint> {
        self.endpoints.get(key)
    }

    /// Names of every bound endpoint, built-ins first
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(|k| k.as_str())
    }

    fn bound(&self, key: &str) -> Result<&Endpoint> {
        self.endpoint(key)
            .ok_or_else(|| RestError::UnknownEndpoint(format!("{}.{}", self.name, key)))
    }

    /// Build the request the named endpoint would send
    pub fn build(&self, key: &str, data: impl Into<CallData>, call: &CallOverride) -> Result<RequestDescriptor> {
        self.bound(key)?.build(&data.into(), call)
    }

    /// Call the named endpoint
    pub async fn call(&self, key: &str, data: impl Into<CallData>, call: CallOverride) -> Result<Reply> {
        self.bound(key)?.call(data, call).await
    }

    /// `GET <name>`, remaining data in the query
    pub async fn get(&self, data: impl Into<CallData>, call: CallOverride) -> Result<Value> {
        Ok(self.call("get", data, call).await?.into_body())
    }

    /// `POST <name>`, data in the body
    pub async fn post(&self, data: impl Into<CallData>, call: CallOverride) -> Result<Value> {
        Ok(self.call("post", data, call).await?.into_body())
    }

    /// `PUT <name>/:id`
    pub async fn update(&self, data: impl Into<CallData>, call: CallOverride) -> Result<Value> {
        Ok(self.call("update", data, call).await?.into_body())
    }

    /// `DELETE <name>/:id`
    pub async fn remove(&self, data: impl Into<CallData>, call: CallOverride) -> Result<Value> {
        Ok(self.call("remove", data, call).await?.into_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Config;
    use crate::descriptor::Body;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};

    fn posts(custom: IndexMap<String, EndpointDescriptor>) -> Resource {
        let requester = Requester::new(Config::new("https://jsonplaceholder.typicode.com")).unwrap();
        create_resource(requester, "posts", custom, Headers::new()).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_get_uses_query() {
        let request = posts(IndexMap::new())
            .build("get", json!({"userId": 1}), &CallOverride::new())
            .unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "posts");
        assert_eq!(request.params, Some(object(json!({"userId": 1}))));
        assert!(request.data.is_none());
    }

    #[test]
    fn test_update_and_remove_take_id() {
        let resource = posts(IndexMap::new());

        let update = resource
            .build("update", json!({"id": 1, "title": "foo2"}), &CallOverride::new())
            .unwrap();
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.url, "posts/1");
        assert_eq!(update.data, Some(Body::Json(json!({"title": "foo2"}))));

        let remove = resource.build("remove", json!({"id": 1}), &CallOverride::new()).unwrap();
        assert_eq!(remove.method, HttpMethod::Delete);
        assert_eq!(remove.url, "posts/1");
        assert_eq!(remove.params, Some(Map::new()));
    }

    #[test]
    fn test_custom_endpoints_win() {
        let mut custom = IndexMap::new();
        custom.insert(
            "getPostComments".to_string(),
            EndpointDescriptor::new(HttpMethod::Get, "posts/:id/comments").param("id"),
        );
        custom.insert(
            "get".to_string(),
            EndpointDescriptor::new(HttpMethod::Get, "posts/recent"),
        );

        let resource = posts(custom);
        let names: Vec<&str> = resource.endpoint_names().collect();
        assert_eq!(names, vec!["get", "post", "update", "remove", "getPostComments"]);

        let comments = resource.build("getPostComments", json!({"id": 3}), &CallOverride::new()).unwrap();
        assert_eq!(comments.url, "posts/3/comments");

        let get = resource.build("get", (), &CallOverride::new()).unwrap();
        assert_eq!(get.url, "posts/recent");
    }

    #[test]
    fn test_form_data_endpoint_sends_dates() {
        let mut custom = IndexMap::new();
        custom.insert(
            "schedule".to_string(),
            EndpointDescriptor::new(HttpMethod::FormData, "posts/:id/schedule").param("id"),
        );

        let at = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let data = CallData::from(json!({"id": 9}))
            .date("publishAt", at + chrono::Duration::milliseconds(123))
            .date("expireAt", at);
        let request = posts(custom).build("schedule", data, &CallOverride::new()).unwrap();

        assert_eq!(request.url, "posts/9/schedule");
        match request.data {
            Some(Body::Multipart(body)) => {
                assert_eq!(body.texts("publishAt"), vec!["2020-01-02T03:04:05.123Z"]);
                assert_eq!(body.texts("expireAt"), vec!["2020-01-02T03:04:05.000Z"]);
                assert!(!body.contains("id"));
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_custom_descriptor_is_rejected() {
        let requester = Requester::new(Config::new("https://api.test")).unwrap();
        let mut custom = IndexMap::new();
        custom.insert("bad".to_string(), EndpointDescriptor::new(HttpMethod::Get, "posts/:id"));

        let err = create_resource(requester, "posts", custom, Headers::new()).unwrap_err();
        assert!(matches!(err, RestError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_unknown_endpoint() {
        let err = posts(IndexMap::new()).build("nope", (), &CallOverride::new()).unwrap_err();
        assert_eq!(err.to_string(), "unknown endpoint: posts.nope");
    }
}
