//! Per-call request descriptor.

use super::headers;
use crate::auth::Authenticator;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Which subsystem issued a request. Drives failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    /// Token exchange with the identity provider.
    Authn,
    /// Operation submission and asset metadata calls.
    Platform,
    /// Job status polling.
    Status,
    /// Raw byte PUT to a signed storage URI.
    Upload,
    /// Raw byte GET from a signed storage URI.
    Download,
}

impl RequestKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKey::Authn => "authn",
            RequestKey::Platform => "platform",
            RequestKey::Status => "status",
            RequestKey::Upload => "upload",
            RequestKey::Download => "download",
        }
    }

    /// Response header holding the request-tracking id.
    pub fn tracking_header(&self) -> &'static str {
        match self {
            RequestKey::Authn => headers::DEBUG_ID,
            _ => headers::REQUEST_ID,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Bytes(Bytes),
    Form(Vec<(String, String)>),
}

/// Everything needed to issue one HTTP call.
///
/// The executor mutates only the `authorization` header and the `retryable`
/// flag, and only during its single re-authentication cycle.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub key: RequestKey,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub read_timeout: Option<Duration>,
    pub retryable: bool,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, key: RequestKey, url: impl Into<String>) -> Self {
        Self {
            method,
            key,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            authenticator: None,
            read_timeout: None,
            retryable: false,
        }
    }

    pub fn get(key: RequestKey, url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, key, url)
    }

    pub fn post(key: RequestKey, url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, key, url)
    }

    pub fn put(key: RequestKey, url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, key, url)
    }

    pub fn delete(key: RequestKey, url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, key, url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.body = Some(RequestBody::Bytes(Bytes::from(bytes)));
        self.header(headers::CONTENT_TYPE, headers::JSON_CONTENT_TYPE)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn bytes(mut self, body: Bytes, media_type: &str) -> Result<Self> {
        self.body = Some(RequestBody::Bytes(body));
        self.header(headers::CONTENT_TYPE, media_type)
    }

    pub fn authenticated(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Value of a header already set on the request.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("key", &self.key)
            .field("url", &self.url)
            .field("header_names", &self.headers.keys().collect::<Vec<_>>())
            .field("authenticated", &self.authenticator.is_some())
            .field("read_timeout", &self.read_timeout)
            .field("retryable", &self.retryable)
            .finish()
    }
}

pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        Error::client_with_context(
            "invalid header name",
            ErrorContext::new()
                .with_field_path(name)
                .with_details(e.to_string()),
        )
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        Error::client_with_context(
            "invalid header value",
            ErrorContext::new()
                .with_field_path(name)
                .with_details(e.to_string()),
        )
    })?;
    Ok((header_name, header_value))
}
