use crate::error::Result;
use crate::headers::Headers;
use crate::template::ParamPolicy;
use crate::token::Token;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create the HTTP client for a requester
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(client)
}

/// Configuration shared by every request of a requester
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL that relative endpoint paths are joined to
    pub host: String,
    /// Default headers, merged over `Accept: application/json`
    pub headers: Headers,
    /// Static token sent in the `Authorization` header
    pub auth_token: Option<Token>,
    /// Content-Type used for PUT/POST/PATCH bodies that set none
    pub body_content_type: String,
    /// Handling of URL parameters missing from call data
    pub param_policy: ParamPolicy,
    /// Whole-request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: String::new(),
            headers: Headers::new(),
            auth_token: None,
            body_content_type: "application/json".to_string(),
            param_policy: ParamPolicy::Strict,
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Create a new configuration for the given base host
    pub fn new(host: impl Into<String>) -> Self {
        Config {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Add a default header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the authentication token
    pub fn with_auth_token(mut self, token: Token) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Set the Content-Type used for bodies that set none
    pub fn with_body_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.body_content_type = content_type.into();
        self
    }

    pub fn with_param_policy(mut self, policy: ParamPolicy) -> Self {
        self.param_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Join a request URL onto the base. Absolute URLs are returned unchanged.
    pub fn join_url(base: &str, url: &str) -> String {
        if url.contains("://") || base.is_empty() {
            return url.to_string();
        }
        if url.is_empty() {
            return base.to_string();
        }
        format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::new("https://jsonplaceholder.typicode.com")
            .with_header("X-App", "demo")
            .with_auth_token(Token::bearer("t"))
            .with_param_policy(ParamPolicy::Lenient);

        assert_eq!(config.host, "https://jsonplaceholder.typicode.com");
        assert_eq!(config.headers["X-App"], "demo");
        assert_eq!(config.body_content_type, "application/json");
        assert_eq!(config.param_policy, ParamPolicy::Lenient);
        assert!(create_rest_client(&config).is_ok());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(Config::join_url("https://api.test/", "/posts"), "https://api.test/posts");
        assert_eq!(Config::join_url("https://api.test/v1", "posts/1"), "https://api.test/v1/posts/1");
        assert_eq!(Config::join_url("https://api.test", "http://other.test/x"), "http://other.test/x");
        assert_eq!(Config::join_url("https://api.test", ""), "https://api.test");
    }
}
