//! The HTTP seam between the backend client and the network.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

pub type Headers = HashMap<String, String>;

/// A fully buffered answer. Bodies here are small JSON documents or sticker
/// and audio files.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a `200 OK` response carrying a JSON body.
    pub fn json_ok(value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::with_headers(200, headers, Bytes::from(value.to_string()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when the body was declared as JSON.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartValue {
    Text(String),
    File {
        filename: String,
        mime: String,
        data: Bytes,
    },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: MultipartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: impl Into<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name: name.into(),
            value: MultipartValue::File {
                filename: filename.into(),
                mime: mime.into(),
                data,
            },
        }
    }
}

/// Transport failures. A non-2xx answer is not one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    ConnectionFailed(String),
    Timeout(String),
    InvalidUrl(String),
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, detail) = match self {
            HttpError::ConnectionFailed(detail) => ("connection failed", detail),
            HttpError::Timeout(detail) => ("timed out", detail),
            HttpError::InvalidUrl(detail) => ("invalid URL", detail),
            HttpError::Other(detail) => ("request failed", detail),
        };
        write!(f, "{}: {}", kind, detail)
    }
}

impl std::error::Error for HttpError {}

/// Non-2xx answers are returned as `Ok(Response)`; only transport failures
/// are errors. The backend client decides what a status code means.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// `body` is already-serialized JSON.
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Sticker, audio and save-sticker uploads.
    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<MultipartField>,
        headers: &Headers,
    ) -> Result<Response, HttpError>;
}
