use crate::response::RawResponse;
use thiserror::Error;

/// Main error type for REST resource operations
#[derive(Debug, Error)]
pub enum RestError {
    /// Non-2xx response; the decoded response is kept unchanged
    #[error("HTTP error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        response: Box<RawResponse>,
    },

    /// Endpoint descriptor whose params do not match its template
    #[error("invalid endpoint descriptor {endpoint}: {reason}")]
    InvalidDescriptor { endpoint: String, reason: String },

    /// URL parameter with no value in the call data
    #[error("missing value for parameter {param} in {endpoint}")]
    MissingParam { param: String, endpoint: String },

    /// No endpoint bound under this name
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Body or query could not be form-encoded
    #[error("encoding error: {0}")]
    Encode(String),

    /// Header name or value rejected by the transport
    #[error("invalid header: {0}")]
    Header(String),

    /// Error returned by a request or response hook
    #[error("hook failed: {0}")]
    Hook(#[from] anyhow::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RestError {
    /// Create an HTTP status error from a decoded response
    pub fn from_response(response: RawResponse) -> Self {
        let status = response.status;
        let message = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown status")
            .to_string();

        RestError::Http {
            status,
            message,
            response: Box::new(response),
        }
    }

    /// Check if this error is a permission denied error (403)
    pub fn is_permission_denied(&self) -> bool {
        self.status_code() == Some(403)
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the HTTP status code, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Http { status, .. } => Some(*status),
            RestError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The response that came with the error, if any
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            RestError::Http { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Result type for REST operations
pub type Result<T> = std::result::Result<T, RestError>;
