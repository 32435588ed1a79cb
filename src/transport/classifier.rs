//! 失败响应分类：把非成功的 HTTP 响应映射为固定的错误类别。
//!
//! Failure classification: maps a non-success response to one error kind.
//!
//! Priority, first match wins:
//!
//! 1. fixed gateway statuses (413, 502, 503, 504) get canned messages
//! 2. upload calls with an XML storage envelope (`Code`, `RequestId`, `Message`)
//! 3. the caller's handler (identity-provider translation)
//! 4. 429 becomes a usage-limit error
//! 5. everything else is parsed as a JSON service envelope
//!
//! Classification is a pure function of the captured response.

use super::headers::header_first;
use super::request::RequestKey;
use crate::error::{Error, ServiceErrorDetails, UNKNOWN_ERROR_CODE};
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

/// Upper bound on raw body text echoed into an error message.
const MAX_RAW_MESSAGE_CHARS: usize = 512;

pub const SERVICE_USAGE_LIMIT_CODE: &str = "429001";
pub const INTEGRATION_USAGE_LIMIT_CODE: &str = "429002";
const SERVICE_USAGE_LIMIT_MESSAGE: &str =
    "Service usage limit has been reached. Please retry after sometime.";
const INTEGRATION_USAGE_LIMIT_MESSAGE: &str =
    "Service usage limit has been reached for the integration. Please retry after sometime.";

const UPLOAD_FAILED_MESSAGE: &str = "Error in uploading file";

/// A non-success response captured in full so it can be classified without I/O.
#[derive(Debug, Clone)]
pub struct FailedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FailedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Drain a response. A body that cannot be read is treated as empty.
    pub async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.unwrap_or_default();
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    pub fn tracking_id(&self, key: RequestKey) -> Option<String> {
        header_first(&self.headers, &[key.tracking_header()])
    }
}

/// Hook run after the canned and upload checks, before the generic fallbacks.
/// Returning `None` defers to the default rules.
pub type ErrorHandler<'a> =
    dyn Fn(&FailedResponse, RequestKey) -> Option<Error> + Send + Sync + 'a;

pub struct ResponseClassifier;

impl ResponseClassifier {
    pub fn classify(
        failure: &FailedResponse,
        key: RequestKey,
        handler: &ErrorHandler<'_>,
    ) -> Error {
        let tracking_id = failure.tracking_id(key);
        let status = failure.status.as_u16();

        if let Some((code, message)) = canned_failure(failure.status) {
            return Error::ServiceApi(ServiceErrorDetails::new(status, code, message, tracking_id));
        }

        if key == RequestKey::Upload {
            return Self::upload_failure(failure, tracking_id);
        }

        if let Some(err) = handler(failure, key) {
            return err;
        }

        if failure.status == StatusCode::TOO_MANY_REQUESTS {
            return Self::usage_limit_failure(failure, tracking_id);
        }

        Self::service_failure(failure, tracking_id)
    }

    /// Classify with the default rules only.
    pub fn classify_default(failure: &FailedResponse, key: RequestKey) -> Error {
        Self::classify(failure, key, &|_: &FailedResponse, _: RequestKey| None)
    }

    fn upload_failure(failure: &FailedResponse, tracking_id: Option<String>) -> Error {
        let status = failure.status.as_u16();
        match parse_storage_envelope(&failure.body_text()) {
            Some(envelope) => Error::ServiceApi(ServiceErrorDetails::new(
                status,
                envelope.code.unwrap_or_default(),
                envelope.message.unwrap_or_default(),
                envelope.request_id.or(tracking_id),
            )),
            None => Error::ServiceApi(ServiceErrorDetails::new(
                status,
                UNKNOWN_ERROR_CODE,
                UPLOAD_FAILED_MESSAGE,
                tracking_id,
            )),
        }
    }

    fn usage_limit_failure(failure: &FailedResponse, tracking_id: Option<String>) -> Error {
        let (code, message) = envelope_fields(failure);
        let message = match code.as_deref() {
            Some(SERVICE_USAGE_LIMIT_CODE) => SERVICE_USAGE_LIMIT_MESSAGE.to_string(),
            Some(INTEGRATION_USAGE_LIMIT_CODE) => INTEGRATION_USAGE_LIMIT_MESSAGE.to_string(),
            _ => message.unwrap_or_else(|| raw_message(failure)),
        };
        Error::UsageLimit(ServiceErrorDetails::new(
            failure.status.as_u16(),
            code.unwrap_or_default(),
            message,
            tracking_id,
        ))
    }

    fn service_failure(failure: &FailedResponse, tracking_id: Option<String>) -> Error {
        let (code, message) = envelope_fields(failure);
        Error::ServiceApi(ServiceErrorDetails::new(
            failure.status.as_u16(),
            code.unwrap_or_default(),
            message.unwrap_or_else(|| raw_message(failure)),
            tracking_id,
        ))
    }
}

fn canned_failure(status: StatusCode) -> Option<(&'static str, &'static str)> {
    match status.as_u16() {
        413 => Some(("RequestEntityTooLarge", "Request entity too large")),
        502 => Some(("BadGateway", "Bad gateway")),
        503 => Some((
            "ServiceUnavailable",
            "The Gateway servers are up, but overloaded with requests. Try again later.",
        )),
        504 => Some((
            "GatewayTimeout",
            concat!(
                "The Gateway servers are up, but the request couldn't be serviced ",
                "due to some failure within our stack. Try again later."
            ),
        )),
        _ => None,
    }
}

/// `error.code`/`error.message`, falling back to top-level `error_code`/`message`.
fn envelope_fields(failure: &FailedResponse) -> (Option<String>, Option<String>) {
    let Some(body) = failure.json() else {
        return (None, None);
    };
    if let Some(error) = body.get("error").filter(|e| e.is_object()) {
        return (
            error.get("code").and_then(scalar_text),
            error.get("message").and_then(scalar_text),
        );
    }
    (
        body.get("error_code").and_then(scalar_text),
        body.get("message").and_then(scalar_text),
    )
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_message(failure: &FailedResponse) -> String {
    let text = failure.body_text();
    let text = text.trim();
    if text.is_empty() {
        return failure
            .status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string();
    }
    text.chars().take(MAX_RAW_MESSAGE_CHARS).collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
struct StorageEnvelope {
    code: Option<String>,
    request_id: Option<String>,
    message: Option<String>,
}

fn parse_storage_envelope(body: &str) -> Option<StorageEnvelope> {
    let mut reader = Reader::from_str(body);
    let mut current: Option<Vec<u8>> = None;
    let mut envelope = StorageEnvelope::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => current = Some(e.local_name().as_ref().to_vec()),
            Ok(Event::Text(t)) => {
                let Some(name) = current.as_deref() else {
                    continue;
                };
                let text = t.unescape().ok()?.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match name {
                    b"Code" => envelope.code = Some(text),
                    b"RequestId" => envelope.request_id = Some(text),
                    b"Message" => envelope.message = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    if envelope == StorageEnvelope::default() {
        None
    } else {
        Some(envelope)
    }
}
