//! # restsource - declarative REST resources for Rust
//!
//! Describe the endpoints of an API once, as method + path template + parameter
//! names, and get back async functions that assemble and send the requests.
//!
//! ## Features
//!
//! - Resources with built-in `get`, `post`, `update` and `remove` operations
//! - Custom endpoints with `:name` path placeholders filled from call data
//! - Layered headers: requester defaults, resource, endpoint and per call
//! - Form-urlencoded and multipart bodies
//! - Request, response and error hooks
//!
//! ## Basic Usage
//!
//! ```no_run
//! use indexmap::IndexMap;
//! use restsource::{json, CallOverride, Config, EndpointDescriptor, HttpMethod, Requester};
//!
//! # async fn run() -> restsource::Result<()> {
//! let requester = Requester::new(Config::new("https://jsonplaceholder.typicode.com"))?;
//!
//! let mut custom = IndexMap::new();
//! custom.insert(
//!     "getPostComments".to_string(),
//!     EndpointDescriptor::new(HttpMethod::Get, "posts/:id/comments").param("id"),
//! );
//! let posts = requester.source("posts", custom, Default::default())?;
//!
//! // GET /posts?userId=1
//! let list = posts.get(json!({"userId": 1}), CallOverride::new()).await?;
//!
//! // PUT /posts/1 with body {"title": "foo2"}
//! let updated = posts.update(json!({"id": 1, "title": "foo2"}), CallOverride::new()).await?;
//!
//! // GET /posts/1/comments
//! let comments = posts
//!     .call("getPostComments", json!({"id": 1}), CallOverride::new())
//!     .await?
//!     .into_body();
//! # let _ = (list, updated, comments);
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! ```no_run
//! use restsource::{Config, Requester, Token};
//!
//! let requester = Requester::new(
//!     Config::new("https://api.example.com").with_auth_token(Token::bearer("access_token")),
//! )?;
//! # Ok::<(), restsource::RestError>(())
//! ```

pub mod builder;
pub mod client;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod headers;
pub mod hooks;
pub mod method;
pub mod multipart;
pub mod requester;
pub mod resource;
pub mod response;
pub mod template;
pub mod token;

// Re-export main types for convenience
pub use builder::build_request;
pub use client::Config;
pub use descriptor::{Body, CallData, CallOverride, EndpointDescriptor, RequestDescriptor, RequestOptions};
pub use error::{RestError, Result};
pub use headers::Headers;
pub use hooks::{ErrorHook, RequestHook, ResponseHook};
pub use method::HttpMethod;
pub use multipart::{build_multipart, FieldValue, FilePart, MultipartBody, MultipartData};
pub use requester::{RequestMeta, Requester};
pub use resource::{create_resource, Endpoint, Resource};
pub use response::{RawResponse, Reply};
pub use template::ParamPolicy;
pub use token::Token;

// Re-export serde_json for convenience
pub use serde_json::json;
