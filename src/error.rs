use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Error code used when the service response carries none.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// Structured error context for client-side failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.connectTimeout")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "job_poller")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure details reported by a remote party (identity provider, platform or storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceErrorDetails {
    pub status_code: u16,
    pub error_code: String,
    pub message: String,
    pub request_tracking_id: Option<String>,
}

impl ServiceErrorDetails {
    pub fn new(
        status_code: u16,
        error_code: impl Into<String>,
        message: impl Into<String>,
        request_tracking_id: Option<String>,
    ) -> Self {
        let error_code = error_code.into();
        Self {
            status_code,
            error_code: if error_code.trim().is_empty() {
                UNKNOWN_ERROR_CODE.to_string()
            } else {
                error_code
            },
            message: message.into(),
            request_tracking_id,
        }
    }
}

impl fmt::Display for ServiceErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "description={}; requestTrackingId={}; statusCode={}; errorCode={}",
            self.message,
            self.request_tracking_id.as_deref().unwrap_or("None"),
            self.status_code,
            self.error_code
        )
    }
}

/// Coarse classification of an [`Error`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local failure: invalid input, configuration, parsing or cancellation.
    Client,
    /// The request never produced an HTTP response.
    Transport,
    /// The identity provider rejected the credentials.
    AuthProvider,
    /// Service quota exhausted (HTTP 429).
    UsageLimit,
    /// Any other non-success response from the platform or storage.
    ServiceApi,
    /// A bounded wait elapsed before the job finished.
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Client => "client",
            ErrorKind::Transport => "transport",
            ErrorKind::AuthProvider => "auth_provider",
            ErrorKind::UsageLimit => "usage_limit",
            ErrorKind::ServiceApi => "service_api",
            ErrorKind::Timeout => "timeout",
        }
    }
}

/// Unified error type for the PDF Services client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Client error: {message}{}", format_context(.context))]
    Client {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Identity provider error: {0}")]
    AuthProvider(ServiceErrorDetails),

    #[error("Service usage limit reached: {0}")]
    UsageLimit(ServiceErrorDetails),

    #[error("Service API error: {0}")]
    ServiceApi(ServiceErrorDetails),

    #[error("Timeout: {message} (requestTrackingId={})", .request_tracking_id.as_deref().unwrap_or("None"))]
    Timeout {
        message: String,
        request_tracking_id: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn client(msg: impl Into<String>) -> Self {
        Error::Client {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new client error with structured context
    pub fn client_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Client {
            message: msg.into(),
            context,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(TransportError::Other(msg.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Client { .. } | Error::Io(_) | Error::Serialization(_) => ErrorKind::Client,
            Error::Transport(_) => ErrorKind::Transport,
            Error::AuthProvider(_) => ErrorKind::AuthProvider,
            Error::UsageLimit(_) => ErrorKind::UsageLimit,
            Error::ServiceApi(_) => ErrorKind::ServiceApi,
            Error::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Remote failure details, for errors that came back from a service.
    pub fn service_details(&self) -> Option<&ServiceErrorDetails> {
        match self {
            Error::AuthProvider(d) | Error::UsageLimit(d) | Error::ServiceApi(d) => Some(d),
            _ => None,
        }
    }

    pub fn request_tracking_id(&self) -> Option<&str> {
        match self {
            Error::Timeout {
                request_tracking_id,
                ..
            } => request_tracking_id.as_deref(),
            _ => self
                .service_details()
                .and_then(|d| d.request_tracking_id.as_deref()),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.service_details().map(|d| d.status_code)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.service_details().map(|d| d.error_code.as_str())
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Client { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True for a platform rejection that a fresh session token may cure.
    pub(crate) fn is_auth_expired(&self) -> bool {
        matches!(self, Error::ServiceApi(d) if d.status_code == 401)
    }
}
