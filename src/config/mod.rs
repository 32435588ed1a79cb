//! 客户端配置：超时、区域、代理与服务地址。
//!
//! Client configuration: timeouts, region, proxy and service base URI.
//!
//! A [`ClientConfig`] is only obtainable through [`ClientConfigBuilder::build`],
//! which validates every knob, so a constructed config is always usable.

mod proxy;
mod region;

pub use proxy::{ProxyCredentials, ProxyScheme, ProxyServerConfig};
pub use region::{Region, EU_PDF_SERVICES_URI, US_PDF_SERVICES_URI};

use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONNECT_TIMEOUT_MS: i64 = 4_000;
pub const DEFAULT_READ_TIMEOUT_MS: i64 = 10_000;

pub const ENV_REGION: &str = "PDF_SERVICES_REGION";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "PDF_SERVICES_CONNECT_TIMEOUT_MS";
pub const ENV_READ_TIMEOUT_MS: &str = "PDF_SERVICES_READ_TIMEOUT_MS";
pub const ENV_PDF_SERVICES_URI: &str = "PDF_SERVICES_URI";

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    connect_timeout: Duration,
    read_timeout: Duration,
    region: Region,
    pdf_services_uri: String,
    proxy: Option<ProxyServerConfig>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Base URI without a trailing slash.
    pub fn pdf_services_uri(&self) -> &str {
        &self.pdf_services_uri
    }

    pub fn proxy(&self) -> Option<&ProxyServerConfig> {
        self.proxy.as_ref()
    }

    /// Join a path onto the base URI.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.pdf_services_uri, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS as u64),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS as u64),
            region: Region::default(),
            pdf_services_uri: Region::default().base_uri().to_string(),
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    connect_timeout_ms: Option<i64>,
    read_timeout_ms: Option<i64>,
    region: Option<Region>,
    pdf_services_uri: Option<String>,
    proxy: Option<ProxyServerConfig>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout_ms(mut self, ms: i64) -> Self {
        self.connect_timeout_ms = Some(ms);
        self
    }

    pub fn read_timeout_ms(mut self, ms: i64) -> Self {
        self.read_timeout_ms = Some(ms);
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Override the region-derived base URI (e.g. a private deployment or a test server).
    pub fn pdf_services_uri(mut self, uri: impl Into<String>) -> Self {
        self.pdf_services_uri = Some(uri.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyServerConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Load settings from a JSON file, or YAML when the extension is `.yaml`/`.yml`.
    ///
    /// Recognised keys: `connectTimeout`, `readTimeout`, `region`,
    /// `pdfServices.pdfServicesUri` and `proxyServerConfig`.
    pub fn load_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let file: ConfigFile = if is_yaml {
            serde_yaml::from_str(&raw).map_err(|e| {
                Error::client_with_context(
                    "invalid configuration file",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source(path.display().to_string()),
                )
            })?
        } else {
            serde_json::from_str(&raw).map_err(|e| {
                Error::client_with_context(
                    "invalid configuration file",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source(path.display().to_string()),
                )
            })?
        };
        debug!(path = %path.display(), "loaded client configuration file");
        self.apply_file(file)
    }

    /// Apply `PDF_SERVICES_*` environment overrides on top of the current settings.
    pub fn load_env(mut self) -> Result<Self> {
        if let Ok(region) = env::var(ENV_REGION) {
            self.region = Some(region.parse()?);
        }
        if let Ok(v) = env::var(ENV_CONNECT_TIMEOUT_MS) {
            self.connect_timeout_ms = Some(parse_millis(&v, ENV_CONNECT_TIMEOUT_MS)?);
        }
        if let Ok(v) = env::var(ENV_READ_TIMEOUT_MS) {
            self.read_timeout_ms = Some(parse_millis(&v, ENV_READ_TIMEOUT_MS)?);
        }
        if let Ok(uri) = env::var(ENV_PDF_SERVICES_URI) {
            if !uri.trim().is_empty() {
                self.pdf_services_uri = Some(uri);
            }
        }
        Ok(self)
    }

    fn apply_file(mut self, file: ConfigFile) -> Result<Self> {
        if let Some(v) = file.connect_timeout {
            self.connect_timeout_ms = Some(v.as_millis("connectTimeout")?);
        }
        if let Some(v) = file.read_timeout {
            self.read_timeout_ms = Some(v.as_millis("readTimeout")?);
        }
        if let Some(region) = file.region {
            self.region = Some(region.parse()?);
        }
        if let Some(uri) = file.pdf_services.and_then(|s| s.pdf_services_uri) {
            self.pdf_services_uri = Some(uri);
        }
        if let Some(proxy) = file.proxy_server_config {
            self.proxy = Some(proxy.into_config()?);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<ClientConfig> {
        let connect_ms = self.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);
        let read_ms = self.read_timeout_ms.unwrap_or(DEFAULT_READ_TIMEOUT_MS);
        if connect_ms <= 0 {
            return Err(Error::client_with_context(
                "Connect timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("connectTimeout")
                    .with_details(format!("got {} ms", connect_ms)),
            ));
        }
        if read_ms <= 0 {
            return Err(Error::client_with_context(
                "Read timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("readTimeout")
                    .with_details(format!("got {} ms", read_ms)),
            ));
        }
        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }

        let region = self.region.unwrap_or_default();
        let uri = match self.pdf_services_uri {
            Some(uri) => {
                url::Url::parse(uri.trim()).map_err(|e| {
                    Error::client_with_context(
                        "PDF Services URI is not a valid URL",
                        ErrorContext::new()
                            .with_field_path("pdfServices.pdfServicesUri")
                            .with_details(e.to_string()),
                    )
                })?;
                uri.trim().trim_end_matches('/').to_string()
            }
            None => region.base_uri().to_string(),
        };

        Ok(ClientConfig {
            connect_timeout: Duration::from_millis(connect_ms as u64),
            read_timeout: Duration::from_millis(read_ms as u64),
            region,
            pdf_services_uri: uri,
            proxy: self.proxy,
        })
    }
}

fn parse_millis(raw: &str, field: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        Error::client_with_context(
            "timeout must be an integer number of milliseconds",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(format!("got '{}'", raw)),
        )
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

impl NumberOrText {
    fn as_millis(&self, field: &str) -> Result<i64> {
        match self {
            NumberOrText::Number(n) => Ok(*n),
            NumberOrText::Text(s) => parse_millis(s, field),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    connect_timeout: Option<NumberOrText>,
    read_timeout: Option<NumberOrText>,
    region: Option<String>,
    pdf_services: Option<PdfServicesSection>,
    proxy_server_config: Option<ProxyFileSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PdfServicesSection {
    pdf_services_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyFileSection {
    host: Option<String>,
    port: Option<NumberOrText>,
    scheme: Option<String>,
    username_password_credentials: Option<CredentialsSection>,
}

#[derive(Debug, Deserialize)]
struct CredentialsSection {
    username: Option<String>,
    password: Option<String>,
}

impl ProxyFileSection {
    fn into_config(self) -> Result<ProxyServerConfig> {
        let mut proxy = ProxyServerConfig::new(self.host.unwrap_or_default());
        if let Some(scheme) = self.scheme {
            proxy = proxy.with_scheme(scheme.parse()?);
        }
        if let Some(port) = self.port {
            let port = port.as_millis("proxyServerConfig.port")?;
            let port = u16::try_from(port).ok().filter(|p| *p > 0).ok_or_else(|| {
                Error::client_with_context(
                    "Proxy port must be between 1 and 65535",
                    ErrorContext::new()
                        .with_field_path("proxyServerConfig.port")
                        .with_details(format!("got {}", port)),
                )
            })?;
            proxy = proxy.with_port(port);
        }
        if let Some(creds) = self.username_password_credentials {
            proxy = proxy.with_credentials(ProxyCredentials::new(
                creds.username.unwrap_or_default(),
                creds.password.unwrap_or_default(),
            )?);
        }
        Ok(proxy)
    }
}
