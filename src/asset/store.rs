//! Asset storage calls: upload URI issuance, byte transfer, refresh and delete.

use super::{Asset, CloudAsset, StreamAsset};
use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::transport::headers::{self, header_first, new_request_id};
use crate::transport::{HttpExecutor, HttpRequest, RequestKey, TransportError};
use crate::{Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Signed upload target issued for a new asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadUri {
    #[serde(rename = "assetID")]
    pub asset_id: String,
    #[serde(rename = "uploadUri")]
    pub upload_uri: String,
}

#[derive(Debug, Deserialize)]
struct DownloadUriResponse {
    #[serde(rename = "downloadUri")]
    download_uri: String,
}

#[derive(Clone)]
pub struct AssetStore {
    executor: HttpExecutor,
    authenticator: Arc<dyn Authenticator>,
    config: Arc<ClientConfig>,
}

impl AssetStore {
    pub fn new(
        executor: HttpExecutor,
        authenticator: Arc<dyn Authenticator>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            executor,
            authenticator,
            config,
        }
    }

    fn asset_url(&self, asset_id: &str) -> String {
        self.config.endpoint(&format!("assets/{}", asset_id))
    }

    /// Ask the service for a new asset id and a signed URI to PUT its bytes to.
    pub async fn get_upload_uri(&self, media_type: &str) -> Result<UploadUri> {
        let request = HttpRequest::post(RequestKey::Platform, self.config.endpoint("assets"))
            .header(headers::REQUEST_ID, &new_request_id())?
            .json(&json!({ "mediaType": media_type }))?
            .authenticated(self.authenticator.clone())
            .read_timeout(self.config.read_timeout());
        let response = self.executor.process(request, &[StatusCode::OK]).await?;
        let bytes = read_body(response).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// PUT raw bytes to a signed upload URI.
    pub async fn upload(&self, upload_uri: &str, bytes: Bytes, media_type: &str) -> Result<()> {
        let request = HttpRequest::put(RequestKey::Upload, upload_uri).bytes(bytes, media_type)?;
        self.executor
            .process(request, &[StatusCode::OK, StatusCode::ACCEPTED])
            .await?;
        Ok(())
    }

    pub async fn upload_asset(&self, asset: StreamAsset) -> Result<CloudAsset> {
        let target = self.get_upload_uri(asset.media_type()).await?;
        debug!(asset_id = %target.asset_id, "Obtained upload URI");
        let media_type = asset.media_type().to_string();
        self.upload(&target.upload_uri, asset.into_bytes(), &media_type)
            .await?;
        info!(asset_id = %target.asset_id, "Uploaded asset");
        Ok(CloudAsset::new(target.asset_id, None))
    }

    /// Fetch a fresh signed download URI for `asset`.
    pub async fn refresh_download_uri(&self, asset: &Asset) -> Result<CloudAsset> {
        let cloud = asset.require_cloud()?;
        let request = HttpRequest::get(RequestKey::Platform, self.asset_url(cloud.asset_id()))
            .header(headers::REQUEST_ID, &new_request_id())?
            .authenticated(self.authenticator.clone())
            .read_timeout(self.config.read_timeout())
            .retryable(true);
        let response = self.executor.process(request, &[StatusCode::OK]).await?;
        let bytes = read_body(response).await?;
        let body: DownloadUriResponse = serde_json::from_slice(&bytes)?;
        Ok(CloudAsset::new(cloud.asset_id(), Some(body.download_uri)))
    }

    pub async fn delete_asset(&self, asset: &Asset) -> Result<()> {
        let cloud = asset.require_cloud()?;
        let request = HttpRequest::delete(RequestKey::Platform, self.asset_url(cloud.asset_id()))
            .header(headers::REQUEST_ID, &new_request_id())?
            .authenticated(self.authenticator.clone())
            .read_timeout(self.config.read_timeout())
            .retryable(true);
        self.executor
            .process(request, &[StatusCode::NO_CONTENT])
            .await?;
        info!(asset_id = cloud.asset_id(), "Deleted asset");
        Ok(())
    }

    /// Download an asset's bytes into memory.
    pub async fn get_content(&self, asset: &CloudAsset) -> Result<StreamAsset> {
        let response = self.download(asset).await?;
        let media_type = header_first(response.headers(), &[headers::CONTENT_TYPE])
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = read_body(response).await?;
        debug!(asset_id = asset.asset_id(), size = bytes.len(), "Downloaded asset");
        StreamAsset::new(bytes, media_type)
    }

    /// Stream an asset's bytes to `path`. Data lands in a sibling temp file first
    /// and is renamed into place only once the download completed.
    pub async fn save_content(&self, asset: &CloudAsset, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let response = self.download(asset).await?;
        let partial = partial_path(&path);

        match write_body(response, &partial).await {
            Ok(size) => {
                tokio::fs::rename(&partial, &path).await?;
                info!(asset_id = asset.asset_id(), size, path = %path.display(), "Saved asset");
                Ok(path)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    warn!(error = %cleanup, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn download(&self, asset: &CloudAsset) -> Result<reqwest::Response> {
        let refreshed;
        let uri = match asset.download_uri() {
            Some(uri) => uri,
            None => {
                refreshed = self
                    .refresh_download_uri(&Asset::Cloud(asset.clone()))
                    .await?;
                refreshed.download_uri().unwrap_or_default()
            }
        };
        let request = HttpRequest::get(RequestKey::Download, uri);
        self.executor.process(request, &[StatusCode::OK]).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<Bytes> {
    response
        .bytes()
        .await
        .map_err(|e| Error::Transport(TransportError::Http(e)))
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    path.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4()))
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Transport(TransportError::Http(e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
