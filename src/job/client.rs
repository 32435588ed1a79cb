//! 作业提交与轮询状态机。
//!
//! Job submission and the poll state machine.

use super::operation::OperationKind;
use super::request::JobRequest;
use super::result::JobResult;
use super::status::{JobStatus, JobStatusResponse, PollResult};
use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::error::ServiceErrorDetails;
use crate::transport::classifier::scalar_text;
use crate::transport::headers::{self, header_first, new_request_id};
use crate::transport::{HttpExecutor, HttpRequest, RequestKey, TransportError};
use crate::{Error, ErrorContext, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Ceiling applied by [`JobClient::poll_bounded`] callers that have no better bound.
pub const DEFAULT_POLL_CEILING: Duration = Duration::from_secs(600);

/// Polling handle returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    location: String,
    kind: OperationKind,
}

impl JobHandle {
    pub fn new(location: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }

    /// The `Location` header of the submission response, verbatim.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

#[derive(Clone)]
pub struct JobClient {
    executor: HttpExecutor,
    authenticator: Arc<dyn Authenticator>,
    config: Arc<ClientConfig>,
}

impl JobClient {
    pub fn new(
        executor: HttpExecutor,
        authenticator: Arc<dyn Authenticator>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            executor,
            authenticator,
            config,
        }
    }

    /// POST the request to its operation endpoint and return the polling handle.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        let kind = request.kind();
        let x_request_id = new_request_id();
        info!(operation = kind.code(), "Started submitting {} job", kind);
        debug!(x_request_id = %x_request_id, "Submitting job");

        let http_request = HttpRequest::post(
            RequestKey::Platform,
            self.config.endpoint(&format!("operation/{}", kind.endpoint())),
        )
        .header(headers::REQUEST_ID, &x_request_id)?
        .header(headers::OPS_INFO, kind.header_info())?
        .json(&request.to_body()?)?
        .authenticated(self.authenticator.clone())
        .read_timeout(self.config.read_timeout());

        let response = self
            .executor
            .process(http_request, &[StatusCode::CREATED])
            .await?;
        let location = header_first(response.headers(), &[headers::LOCATION]).ok_or_else(|| {
            Error::ServiceApi(ServiceErrorDetails::new(
                response.status().as_u16(),
                "",
                "job submission response did not include a Location header",
                header_first(response.headers(), &[headers::REQUEST_ID]),
            ))
        })?;

        info!(operation = kind.code(), "Finished submitting {} job", kind);
        Ok(JobHandle::new(location, kind))
    }

    /// Single status query, no result mapping.
    pub async fn get_job_status(&self, location: &str) -> Result<JobStatusResponse> {
        let (status, headers, _) = self.fetch_status(location).await?;
        Ok(JobStatusResponse::new(status, headers))
    }

    /// Poll until the job is done or failed. No wall-clock ceiling.
    pub async fn poll(&self, handle: &JobHandle) -> Result<PollResult> {
        self.poll_loop(handle, None, None).await
    }

    /// Poll with a wall-clock ceiling. Exceeding it yields [`Error::Timeout`].
    pub async fn poll_bounded(&self, handle: &JobHandle, ceiling: Duration) -> Result<PollResult> {
        self.poll_loop(handle, Some(Instant::now() + ceiling), None)
            .await
    }

    /// Poll until done, failed, or `cancel` fires. Cancellation yields a client error.
    pub async fn poll_until_cancelled(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<PollResult> {
        self.poll_loop(handle, None, Some(cancel)).await
    }

    async fn poll_loop(
        &self,
        handle: &JobHandle,
        deadline: Option<Instant>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult> {
        let mut last_tracking_id: Option<String> = None;
        loop {
            let outcome = tokio::select! {
                _ = cancelled(cancel) => return Err(interrupted()),
                _ = deadline_reached(deadline) => return Err(timed_out(last_tracking_id.take())),
                outcome = self.poll_once(handle) => outcome?,
            };
            last_tracking_id = outcome.request_tracking_id();
            if outcome.status().is_terminal() {
                return Ok(outcome);
            }

            let wait = outcome.retry_interval();
            debug!(
                retry_after_secs = wait.as_secs_f64(),
                "Job is in progress, polling again"
            );
            tokio::select! {
                _ = cancelled(cancel) => return Err(interrupted()),
                _ = deadline_reached(deadline) => return Err(timed_out(last_tracking_id.take())),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    async fn poll_once(&self, handle: &JobHandle) -> Result<PollResult> {
        let (status, headers, body) = self.fetch_status(handle.location()).await?;
        match status {
            JobStatus::InProgress => Ok(PollResult::new(status, headers, None)),
            JobStatus::Failed => Err(job_failure(&body, &headers)),
            JobStatus::Done => {
                let mapper = handle.kind().result_shape().mapper();
                let mut result = mapper(&body)?;
                if let JobResult::Extract {
                    content: Some(content),
                    content_json,
                    ..
                } = &mut result
                {
                    if let Some(uri) = content.download_uri() {
                        *content_json = Some(self.fetch_json(uri).await?);
                    }
                }
                info!(operation = handle.kind().code(), "Job finished");
                Ok(PollResult::new(status, headers, Some(result)))
            }
        }
    }

    async fn fetch_status(&self, location: &str) -> Result<(JobStatus, HeaderMap, Value)> {
        if location.trim().is_empty() {
            return Err(Error::client_with_context(
                "Polling URL can not be empty",
                ErrorContext::new().with_field_path("location"),
            ));
        }
        let request = HttpRequest::get(RequestKey::Status, location)
            .header(headers::REQUEST_ID, &new_request_id())?
            .authenticated(self.authenticator.clone())
            .read_timeout(self.config.read_timeout())
            .retryable(true);

        let response = self
            .executor
            .process(request, &[StatusCode::OK, StatusCode::ACCEPTED])
            .await?;
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let body: Value = serde_json::from_slice(&bytes)?;

        let raw = body.get("status").and_then(Value::as_str).unwrap_or_default();
        let status = JobStatus::parse(raw).ok_or_else(|| {
            Error::client_with_context(
                "unrecognized job status",
                ErrorContext::new()
                    .with_field_path("status")
                    .with_details(format!("got '{}'", raw))
                    .with_source("job_poller"),
            )
        })?;
        debug!(job_status = status.as_str(), "Polled job status");
        Ok((status, headers, body))
    }

    async fn fetch_json(&self, uri: &str) -> Result<Value> {
        let request = HttpRequest::get(RequestKey::Platform, uri)
            .read_timeout(self.config.read_timeout())
            .retryable(true);
        let response = self.executor.process(request, &[StatusCode::OK]).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn job_failure(body: &Value, headers: &HeaderMap) -> Error {
    let error = body.get("error");
    let field = |name: &str| error.and_then(|e| e.get(name)).and_then(scalar_text);
    let status = error
        .and_then(|e| e.get("status"))
        .and_then(|s| match s {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(0);
    Error::ServiceApi(ServiceErrorDetails::new(
        status,
        field("code").unwrap_or_default(),
        field("message").unwrap_or_else(|| "Job failed".to_string()),
        header_first(headers, &[headers::REQUEST_ID]),
    ))
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn interrupted() -> Error {
    Error::client_with_context(
        "Polling was interrupted",
        ErrorContext::new().with_source("job_poller"),
    )
}

fn timed_out(request_tracking_id: Option<String>) -> Error {
    Error::Timeout {
        message: "Job did not reach a terminal state before the polling ceiling".to_string(),
        request_tracking_id,
    }
}
