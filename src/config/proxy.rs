//! Outbound proxy settings.

use crate::transport::TransportError;
use crate::{Error, ErrorContext, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProxyScheme {
    #[default]
    Http,
    Https,
}

impl ProxyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ProxyScheme::Http => 80,
            ProxyScheme::Https => 443,
        }
    }
}

impl FromStr for ProxyScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyScheme::Http),
            "https" => Ok(ProxyScheme::Https),
            other => Err(Error::client_with_context(
                format!("unsupported proxy scheme '{}'", other),
                ErrorContext::new().with_field_path("proxyServerConfig.scheme"),
            )),
        }
    }
}

/// Basic credentials for an authenticating proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    username: String,
    password: String,
}

impl ProxyCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(Error::client_with_context(
                "Username must not be blank",
                ErrorContext::new().with_field_path("usernamePasswordCredentials.username"),
            ));
        }
        if password.trim().is_empty() {
            return Err(Error::client_with_context(
                "Password must not be blank",
                ErrorContext::new().with_field_path("usernamePasswordCredentials.password"),
            ));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proxy server every request is routed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyServerConfig {
    host: String,
    port: Option<u16>,
    scheme: ProxyScheme,
    credentials: Option<ProxyCredentials>,
}

impl ProxyServerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            scheme: ProxyScheme::default(),
            credentials: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: ProxyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_credentials(mut self, credentials: ProxyCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, or the scheme's well-known port.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    pub fn credentials(&self) -> Option<&ProxyCredentials> {
        self.credentials.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::client_with_context(
                "Proxy host must not be blank",
                ErrorContext::new().with_field_path("proxyServerConfig.host"),
            ));
        }
        if self.port == Some(0) {
            return Err(Error::client_with_context(
                "Proxy port must be greater than zero",
                ErrorContext::new().with_field_path("proxyServerConfig.port"),
            ));
        }
        Ok(())
    }

    /// `scheme://host:port`, credentials excluded.
    pub fn proxy_url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port())
    }

    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let mut proxy = reqwest::Proxy::all(self.proxy_url())
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        if let Some(creds) = &self.credentials {
            proxy = proxy.basic_auth(creds.username(), creds.password());
        }
        Ok(proxy)
    }
}
