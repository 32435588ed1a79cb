use super::request::{HttpMethod, HttpRequest, RequestBody};
use crate::config::ClientConfig;
use crate::Result;
use std::time::Duration;
use tracing::trace;

/// Thin wrapper over a pooled `reqwest::Client` configured from [`ClientConfig`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Per-request read timeouts are applied in `execute`; the client only bounds connects.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .user_agent(super::headers::SDK_IDENTITY.as_str());

        if let Some(proxy) = config.proxy() {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// Issue the call described by `request` once. Status codes are not inspected here.
    pub async fn execute(&self, request: &HttpRequest) -> Result<reqwest::Response> {
        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        req = req.headers(request.headers.clone());
        if let Some(timeout) = request.read_timeout {
            req = req.timeout(timeout);
        }
        req = match &request.body {
            Some(RequestBody::Bytes(bytes)) => req.body(bytes.clone()),
            Some(RequestBody::Form(fields)) => req.form(fields),
            None => req,
        };

        trace!(
            method = request.method.as_str(),
            request_key = request.key.as_str(),
            "sending request"
        );
        req.send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
