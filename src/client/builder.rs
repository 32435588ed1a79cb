use crate::asset::{AssetStore, BatchUploadConfig, BatchUploader};
use crate::auth::{self, Clock, Credentials, SystemClock};
use crate::client::core::PdfServices;
use crate::config::ClientConfig;
use crate::job::JobClient;
use crate::transport::{HttpExecutor, HttpTransport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::debug;

/// Builder for [`PdfServices`].
///
/// Credentials are required; everything else has a default.
pub struct PdfServicesBuilder {
    credentials: Option<Credentials>,
    config: Option<ClientConfig>,
    batch: BatchUploadConfig,
    clock: Arc<dyn Clock>,
}

impl PdfServicesBuilder {
    pub fn new() -> Self {
        Self {
            credentials: None,
            config: None,
            batch: BatchUploadConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn credentials(mut self, credentials: impl Into<Credentials>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Worker count and per-upload timeout for batch uploads.
    pub fn batch_upload(mut self, config: BatchUploadConfig) -> Self {
        self.batch = config;
        self
    }

    /// Time source for token expiry (tests use [`crate::auth::TestClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<PdfServices> {
        let credentials = self.credentials.ok_or_else(|| {
            Error::client_with_context(
                "Credentials are required",
                ErrorContext::new().with_source("pdf_services_builder"),
            )
        })?;
        let config = Arc::new(self.config.unwrap_or_default());

        let transport = Arc::new(HttpTransport::new(&config)?);
        let executor = HttpExecutor::new(transport);
        let authenticator =
            auth::authenticator_for(&credentials, &config, executor.clone(), self.clock);

        let jobs = JobClient::new(executor.clone(), authenticator.clone(), config.clone());
        let store = AssetStore::new(executor, authenticator, config.clone());
        let batch = BatchUploader::with_config(store.clone(), self.batch);

        debug!(
            base_uri = config.pdf_services_uri(),
            region = %config.region(),
            "Built PDF Services client"
        );
        Ok(PdfServices::from_parts(config, jobs, store, batch))
    }
}

impl Default for PdfServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
