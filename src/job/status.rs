use super::result::JobResult;
use crate::transport::headers::{header_first, REQUEST_ID, RETRY_AFTER};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wait used when an in-progress response omits `retry-after`.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "failed")]
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "in progress",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in progress" | "in_progress" => Some(JobStatus::InProgress),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// How long to wait before the next poll: the `retry-after` seconds while the
/// job is in progress, zero otherwise.
pub fn retry_interval(status: JobStatus, headers: &HeaderMap) -> Duration {
    if status != JobStatus::InProgress {
        return Duration::ZERO;
    }
    header_first(headers, &[RETRY_AFTER])
        .and_then(|v| v.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(DEFAULT_RETRY_INTERVAL)
}

/// Status of a job from a single status query.
#[derive(Debug, Clone)]
pub struct JobStatusResponse {
    status: JobStatus,
    headers: HeaderMap,
}

impl JobStatusResponse {
    pub fn new(status: JobStatus, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn retry_interval(&self) -> Duration {
        retry_interval(self.status, &self.headers)
    }

    pub fn request_tracking_id(&self) -> Option<String> {
        header_first(&self.headers, &[REQUEST_ID])
    }
}

/// Outcome of one poll. `result` is present once the job is done.
#[derive(Debug, Clone)]
pub struct PollResult {
    status: JobStatus,
    headers: HeaderMap,
    result: Option<JobResult>,
}

impl PollResult {
    pub fn new(status: JobStatus, headers: HeaderMap, result: Option<JobResult>) -> Self {
        Self {
            status,
            headers,
            result,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<JobResult> {
        self.result
    }

    pub fn retry_interval(&self) -> Duration {
        retry_interval(self.status, &self.headers)
    }

    pub fn request_tracking_id(&self) -> Option<String> {
        header_first(&self.headers, &[REQUEST_ID])
    }
}
