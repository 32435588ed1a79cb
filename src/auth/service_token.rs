use super::credentials::StaticTokenCredentials;
use super::token::SessionToken;
use super::Authenticator;
use crate::Result;
use async_trait::async_trait;

/// Serves a pre-issued token. Refreshing returns the same token without network I/O,
/// so an expired external token keeps being rejected by the service.
#[derive(Debug, Clone)]
pub struct StaticTokenAuthenticator {
    client_id: String,
    token: SessionToken,
}

impl StaticTokenAuthenticator {
    pub fn new(credentials: &StaticTokenCredentials) -> Self {
        Self {
            client_id: credentials.client_id().to_string(),
            token: SessionToken::non_expiring(credentials.token()),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn session_token(&self) -> Result<SessionToken> {
        Ok(self.token.clone())
    }

    async fn refresh_token(&self) -> Result<SessionToken> {
        Ok(self.token.clone())
    }

    fn api_key(&self) -> &str {
        &self.client_id
    }
}
