//! 请求执行逻辑：默认请求头、鉴权注入、失败分类与一次性重新鉴权。
//!
//! Request execution: default headers, credential injection, failure
//! classification and the single re-authentication retry.

use super::classifier::{FailedResponse, ResponseClassifier};
use super::headers;
use super::http::HttpTransport;
use super::request::{header_pair, HttpRequest, RequestKey};
use crate::auth::SessionToken;
use crate::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<HttpTransport>,
}

impl HttpExecutor {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Execute `request`, returning the response when its status is one of `success_codes`.
    pub async fn process(
        &self,
        request: HttpRequest,
        success_codes: &[StatusCode],
    ) -> Result<reqwest::Response> {
        self.process_with_handler(request, success_codes, |_: &FailedResponse, _: RequestKey| {
            None
        })
        .await
    }

    /// Like [`process`](Self::process), with a classification hook for subsystem-specific
    /// error bodies. The hook runs after the fixed-status and upload rules.
    pub async fn process_with_handler<H>(
        &self,
        mut request: HttpRequest,
        success_codes: &[StatusCode],
        handler: H,
    ) -> Result<reqwest::Response>
    where
        H: Fn(&FailedResponse, RequestKey) -> Option<Error> + Send + Sync,
    {
        append_default_headers(&mut request.headers)?;
        if let Some(authenticator) = request.authenticator.clone() {
            let token = authenticator.session_token().await?;
            set_authorization(&mut request.headers, &token)?;
            let (name, value) = header_pair(headers::API_KEY, authenticator.api_key())?;
            request.headers.insert(name, value);
        }

        loop {
            let started = Instant::now();
            let response = self.transport.execute(&request).await?;
            let status = response.status();
            if success_codes.contains(&status) {
                debug!(
                    http_status = status.as_u16(),
                    request_key = request.key.as_str(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "request succeeded"
                );
                return Ok(response);
            }

            info!(
                http_status = status.as_u16(),
                request_key = request.key.as_str(),
                "Failure response code {} encountered from backend",
                status.as_u16()
            );
            let failure = FailedResponse::read(response).await;
            let error = ResponseClassifier::classify(&failure, request.key, &handler);

            match request.authenticator.clone() {
                Some(authenticator) if request.retryable && error.is_auth_expired() => {
                    info!(
                        request_key = request.key.as_str(),
                        "Re-authenticating as the access token was rejected"
                    );
                    request.retryable = false;
                    let token = authenticator.refresh_token().await?;
                    set_authorization(&mut request.headers, &token)?;
                }
                _ => return Err(error),
            }
        }
    }
}

fn append_default_headers(headers: &mut HeaderMap) -> Result<()> {
    let (name, value) = header_pair(headers::APP_INFO, headers::SDK_IDENTITY.as_str())?;
    headers.insert(name, value);
    let (name, value) = header_pair(headers::ACCEPT, headers::ACCEPT_VALUE)?;
    headers.insert(name, value);
    Ok(())
}

fn set_authorization(headers: &mut HeaderMap, token: &SessionToken) -> Result<()> {
    let bearer = format!("Bearer {}", token.access_token());
    let (name, mut value) = header_pair(headers::AUTHORIZATION, &bearer)?;
    value.set_sensitive(true);
    headers.insert(name, value);
    Ok(())
}
