use crate::{Error, ErrorContext, Result};
use std::env;
use std::fmt;

pub const ENV_CLIENT_ID: &str = "PDF_SERVICES_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "PDF_SERVICES_CLIENT_SECRET";

fn require(value: String, field: &str, message: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::client_with_context(
            message,
            ErrorContext::new()
                .with_field_path(field)
                .with_source("credentials"),
        ));
    }
    Ok(value)
}

/// OAuth client-credentials pair issued by the developer console.
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePrincipalCredentials {
    client_id: String,
    client_secret: String,
}

impl ServicePrincipalCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client_id: require(client_id.into(), "client_id", "Client ID can not be empty")?,
            client_secret: require(
                client_secret.into(),
                "client_secret",
                "Client Secret can not be empty",
            )?,
        })
    }

    /// Read `PDF_SERVICES_CLIENT_ID` and `PDF_SERVICES_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::new(
            env::var(ENV_CLIENT_ID).unwrap_or_default(),
            env::var(ENV_CLIENT_SECRET).unwrap_or_default(),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ServicePrincipalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipalCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// A pre-issued bearer token. Never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticTokenCredentials {
    client_id: String,
    token: String,
}

impl StaticTokenCredentials {
    pub fn new(client_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client_id: require(client_id.into(), "client_id", "Client ID can not be empty")?,
            token: require(token.into(), "token", "Token can not be empty")?,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for StaticTokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredentials")
            .field("client_id", &self.client_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ServicePrincipal(ServicePrincipalCredentials),
    StaticToken(StaticTokenCredentials),
}

impl Credentials {
    pub fn client_id(&self) -> &str {
        match self {
            Credentials::ServicePrincipal(c) => c.client_id(),
            Credentials::StaticToken(c) => c.client_id(),
        }
    }
}

impl From<ServicePrincipalCredentials> for Credentials {
    fn from(c: ServicePrincipalCredentials) -> Self {
        Credentials::ServicePrincipal(c)
    }
}

impl From<StaticTokenCredentials> for Credentials {
    fn from(c: StaticTokenCredentials) -> Self {
        Credentials::StaticToken(c)
    }
}
