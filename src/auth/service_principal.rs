//! OAuth client-credentials authenticator.

use super::credentials::ServicePrincipalCredentials;
use super::token::{Clock, SessionToken, SystemClock};
use super::Authenticator;
use crate::config::ClientConfig;
use crate::error::ServiceErrorDetails;
use crate::transport::{FailedResponse, HttpExecutor, HttpRequest, RequestKey, TransportError};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

const INVALID_TOKEN_ERROR: &str = "invalid_token";
const SIGNATURE_MISMATCH: &str = "Could not match signature to any of the bindings";
const CERTIFICATE_EXPIRED_MESSAGE: &str = "Your certificate for PDF Services API credentials might have expired. Please visit Adobe IO Console(http://console.adobe.io/) to update your public certificate to use the same credentials.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Either your certificate for PDF Services API credentials has expired or an invalid Organization_ID/Account_ID has been used in credentials. Please visit Adobe IO Console(http://console.adobe.io/) to update your public certificate to use the same credentials or to check the value of Organization Id or Account ID.";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
struct IdentityErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges client id/secret for a session token and caches it.
///
/// The cache lock is held across the token round-trip, so concurrent callers
/// that find a stale token wait for the first refresh instead of issuing their own.
pub struct ServicePrincipalAuthenticator {
    credentials: ServicePrincipalCredentials,
    token_url: String,
    read_timeout: Duration,
    executor: HttpExecutor,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<SessionToken>>,
}

impl ServicePrincipalAuthenticator {
    pub fn new(
        credentials: ServicePrincipalCredentials,
        config: &ClientConfig,
        executor: HttpExecutor,
    ) -> Self {
        Self {
            credentials,
            token_url: config.endpoint("token"),
            read_timeout: config.read_timeout(),
            executor,
            clock: Arc::new(SystemClock),
            cached: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn request_token(&self) -> Result<SessionToken> {
        let request = HttpRequest::post(RequestKey::Authn, self.token_url.as_str())
            .form(vec![
                ("client_id".to_string(), self.credentials.client_id().to_string()),
                (
                    "client_secret".to_string(),
                    self.credentials.client_secret().to_string(),
                ),
            ])
            .read_timeout(self.read_timeout);

        let response = self
            .executor
            .process_with_handler(request, &[StatusCode::OK], identity_failure)
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let token: TokenResponse = serde_json::from_slice(&body)?;

        info!(expires_in_secs = token.expires_in, "Obtained new session token");
        Ok(SessionToken::expiring_in(
            token.access_token,
            Duration::from_secs(token.expires_in),
            self.clock.now(),
        ))
    }
}

#[async_trait]
impl Authenticator for ServicePrincipalAuthenticator {
    async fn session_token(&self) -> Result<SessionToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh(self.clock.now()) {
                return Ok(token.clone());
            }
            debug!("Session token is within its refresh window");
        }
        let fresh = self.request_token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    async fn refresh_token(&self) -> Result<SessionToken> {
        let mut cached = self.cached.lock().await;
        let fresh = self.request_token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    fn api_key(&self) -> &str {
        self.credentials.client_id()
    }
}

/// Translate identity-provider rejections into [`Error::AuthProvider`].
fn identity_failure(failure: &FailedResponse, key: RequestKey) -> Option<Error> {
    let body: IdentityErrorBody = serde_json::from_slice(&failure.body).ok()?;
    let code = body.error.filter(|e| !e.trim().is_empty())?;
    let description = body
        .error_description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| code.clone());

    let message = if code == INVALID_TOKEN_ERROR {
        if description.contains(SIGNATURE_MISMATCH) {
            CERTIFICATE_EXPIRED_MESSAGE.to_string()
        } else {
            INVALID_CREDENTIALS_MESSAGE.to_string()
        }
    } else {
        description
    };

    Some(Error::AuthProvider(ServiceErrorDetails::new(
        failure.status.as_u16(),
        code,
        message,
        failure.tracking_id(key),
    )))
}
