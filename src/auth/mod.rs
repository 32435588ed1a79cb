//! 鉴权：会话令牌的获取、缓存与刷新。
//!
//! Authentication: session token acquisition, caching and refresh.

mod credentials;
mod service_principal;
mod service_token;
mod token;

pub use credentials::{
    Credentials, ServicePrincipalCredentials, StaticTokenCredentials, ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
};
pub use service_principal::ServicePrincipalAuthenticator;
pub use service_token::StaticTokenAuthenticator;
pub use token::{Clock, SessionToken, SystemClock, TestClock, REFRESH_GRACE_PERIOD};

use crate::config::ClientConfig;
use crate::transport::HttpExecutor;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of bearer tokens and the API key attached to authenticated calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// A token valid for at least the refresh grace period, refreshing first if needed.
    async fn session_token(&self) -> Result<SessionToken>;

    /// Unconditionally obtain a new token.
    async fn refresh_token(&self) -> Result<SessionToken>;

    fn api_key(&self) -> &str;
}

/// Build the authenticator matching `credentials`.
pub fn authenticator_for(
    credentials: &Credentials,
    config: &ClientConfig,
    executor: HttpExecutor,
    clock: Arc<dyn Clock>,
) -> Arc<dyn Authenticator> {
    match credentials {
        Credentials::ServicePrincipal(creds) => Arc::new(
            ServicePrincipalAuthenticator::new(creds.clone(), config, executor).with_clock(clock),
        ),
        Credentials::StaticToken(creds) => Arc::new(StaticTokenAuthenticator::new(creds)),
    }
}
