use serde::{Deserialize, Serialize};

/// Token is a static credential sent in the `Authorization` header of every
/// request made by a requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The credential itself
    pub value: String,

    /// Authorization scheme prefix, e.g. "Bearer". `None` sends the value as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Token {
    /// A token sent verbatim as the header value
    pub fn raw(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
            token_type: None,
        }
    }

    /// A token sent as `Bearer <value>`
    pub fn bearer(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
            token_type: Some("Bearer".to_string()),
        }
    }

    /// The `Authorization` header value
    pub fn header_value(&self) -> String {
        match self.token_type {
            Some(ref scheme) => format!("{} {}", scheme, self.value),
            None => self.value.clone(),
        }
    }
}
