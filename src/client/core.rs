use crate::asset::{
    Asset, AssetStore, BatchUploadResult, BatchUploader, CloudAsset, StreamAsset,
};
use crate::client::builder::PdfServicesBuilder;
use crate::config::ClientConfig;
use crate::job::{JobClient, JobHandle, JobRequest, JobStatusResponse, PollResult};
use crate::Result;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Facade over job submission, polling and asset transfer.
///
/// Cheap to clone; clones share one authenticator and one connection pool.
#[derive(Clone)]
pub struct PdfServices {
    config: Arc<ClientConfig>,
    jobs: JobClient,
    store: AssetStore,
    batch: BatchUploader,
}

impl PdfServices {
    pub fn builder() -> PdfServicesBuilder {
        PdfServicesBuilder::new()
    }

    pub(crate) fn from_parts(
        config: Arc<ClientConfig>,
        jobs: JobClient,
        store: AssetStore,
        batch: BatchUploader,
    ) -> Self {
        Self {
            config,
            jobs,
            store,
            batch,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobClient {
        &self.jobs
    }

    pub fn assets(&self) -> &AssetStore {
        &self.store
    }

    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        self.jobs.submit(request).await
    }

    pub async fn get_job_status(&self, location: &str) -> Result<JobStatusResponse> {
        self.jobs.get_job_status(location).await
    }

    /// Poll until the job finishes. Unbounded; wrap in a timeout or use
    /// [`get_job_result_bounded`](Self::get_job_result_bounded) to cap the wait.
    pub async fn get_job_result(&self, handle: &JobHandle) -> Result<PollResult> {
        self.jobs.poll(handle).await
    }

    pub async fn get_job_result_bounded(
        &self,
        handle: &JobHandle,
        ceiling: Duration,
    ) -> Result<PollResult> {
        self.jobs.poll_bounded(handle, ceiling).await
    }

    pub async fn get_job_result_cancellable(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<PollResult> {
        self.jobs.poll_until_cancelled(handle, cancel).await
    }

    pub async fn upload(&self, bytes: impl Into<Bytes>, media_type: &str) -> Result<CloudAsset> {
        self.store
            .upload_asset(StreamAsset::new(bytes, media_type)?)
            .await
    }

    /// Upload a batch; returns assets in input order or the first failure.
    pub async fn upload_assets(&self, assets: Vec<StreamAsset>) -> Result<Vec<CloudAsset>> {
        self.batch.upload(assets).await
    }

    /// Upload a batch and report every outcome individually.
    pub async fn upload_assets_settled(&self, assets: Vec<StreamAsset>) -> BatchUploadResult {
        self.batch.upload_settled(assets).await
    }

    pub async fn get_content(&self, asset: &CloudAsset) -> Result<StreamAsset> {
        self.store.get_content(asset).await
    }

    pub async fn save_content(
        &self,
        asset: &CloudAsset,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.store.save_content(asset, path).await
    }

    pub async fn refresh_download_uri(&self, asset: &Asset) -> Result<CloudAsset> {
        self.store.refresh_download_uri(asset).await
    }

    pub async fn delete_asset(&self, asset: &Asset) -> Result<()> {
        self.store.delete_asset(asset).await
    }
}
