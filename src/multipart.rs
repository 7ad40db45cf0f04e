use crate::descriptor::{Body, RequestDescriptor};
use crate::error::{RestError, Result};
use crate::headers::{self, Headers};
use crate::method::HttpMethod;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;

/// A file to upload as a single part. Parts stay plain data until the request
/// is sent, so a built request can still be inspected and cloned.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        FilePart {
            file_name: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the part after the file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());

        Ok(FilePart {
            file_name,
            content_type: None,
            bytes,
        })
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    fn into_part(self) -> Result<Part> {
        let mut part = Part::bytes(self.bytes);
        if let Some(name) = self.file_name {
            part = part.file_name(name);
        }
        if let Some(mime) = self.content_type {
            part = part
                .mime_str(&mime)
                .map_err(|e| RestError::Header(format!("invalid MIME type {}: {}", mime, e)))?;
        }
        Ok(part)
    }
}

/// A scalar form field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(DateTime<Utc>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// JSON form used when the field goes into a JSON body or a query string
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::List(items) => Value::Array(items.iter().map(|i| i.to_json()).collect()),
            other => other.to_text().map(Value::String).unwrap_or(Value::Null),
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Date(date) => Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            FieldValue::List(items) => {
                let texts: Vec<String> = items.iter().filter_map(|i| i.to_text()).collect();
                Some(texts.join(","))
            }
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(_) => FieldValue::Text(value.to_string()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

/// Input of the multipart builder
#[derive(Debug, Clone, Default)]
pub struct MultipartData {
    pub files: IndexMap<String, FilePart>,
    pub fields: IndexMap<String, FieldValue>,
}

impl MultipartData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File(FilePart),
}

/// Ordered list of named parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    pub parts: Vec<(String, PartValue)>,
}

impl MultipartBody {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Text values of every part with this name, in order
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, part)| match part {
                PartValue::Text(text) => Some(text.as_str()),
                PartValue::File(_) => None,
            })
            .collect()
    }

    /// Whether any part carries this name
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    /// Convert into a reqwest form for sending
    pub fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, part) in self.parts {
            form = match part {
                PartValue::Text(text) => form.text(name, text),
                PartValue::File(file) => form.part(name, file.into_part()?),
            };
        }
        Ok(form)
    }
}

/// Build a multipart `POST` to `endpoint`.
///
/// Files become one part each. Fields: dates are sent as ISO-8601, lists as one
/// part per non-null element under the same name, null values are left out.
/// The `Accept` header is dropped.
pub fn build_multipart(data: MultipartData, headers: &Headers, endpoint: &str) -> RequestDescriptor {
    let mut body = MultipartBody::default();

    for (name, file) in data.files {
        body.parts.push((name, PartValue::File(file)));
    }

    for (name, value) in data.fields {
        match value {
            FieldValue::List(items) => {
                for item in items {
                    if let Some(text) = item.to_text() {
                        body.parts.push((name.clone(), PartValue::Text(text)));
                    }
                }
            }
            other => {
                if let Some(text) = other.to_text() {
                    body.parts.push((name, PartValue::Text(text)));
                }
            }
        }
    }

    let mut headers = headers.clone();
    headers::remove(&mut headers, "Accept");

    let mut request = RequestDescriptor::new(HttpMethod::Post, endpoint);
    request.headers = headers;
    request.data = Some(Body::Multipart(body));
    request
}
