//! Batch upload over a bounded worker pool.

use super::store::AssetStore;
use super::{CloudAsset, StreamAsset};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-asset outcomes, keyed by input index.
#[derive(Debug)]
pub struct BatchUploadResult {
    pub successes: Vec<(usize, CloudAsset)>,
    pub failures: Vec<(usize, Error)>,
    pub execution_time: Duration,
    pub total_processed: usize,
}

impl BatchUploadResult {
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            execution_time: Duration::ZERO,
            total_processed: 0,
        }
    }
    pub fn add_success(&mut self, i: usize, r: CloudAsset) {
        self.successes.push((i, r));
    }
    pub fn add_failure(&mut self, i: usize, e: Error) {
        self.failures.push((i, e));
    }
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Uploaded asset for input `index`, if that upload succeeded.
    pub fn asset(&self, index: usize) -> Option<&CloudAsset> {
        self.successes
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, a)| a)
    }

    /// Assets in input order, or the first failure recorded while draining.
    pub fn into_assets(mut self) -> Result<Vec<CloudAsset>> {
        if !self.failures.is_empty() {
            return Err(self.failures.swap_remove(0).1);
        }
        self.successes.sort_by_key(|(i, _)| *i);
        Ok(self.successes.into_iter().map(|(_, a)| a).collect())
    }

    fn sort(&mut self) {
        self.successes.sort_by_key(|(i, _)| *i);
    }
}

impl Default for BatchUploadResult {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct BatchUploadConfig {
    pub max_workers: usize,
    pub task_timeout: Option<Duration>,
}

impl Default for BatchUploadConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            task_timeout: Some(DEFAULT_TASK_TIMEOUT),
        }
    }
}

impl BatchUploadConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = n.max(1);
        self
    }
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }
}

/// Fans uploads out over at most `max_workers` concurrent tasks.
#[derive(Clone)]
pub struct BatchUploader {
    store: AssetStore,
    config: BatchUploadConfig,
}

impl BatchUploader {
    pub fn new(store: AssetStore) -> Self {
        Self::with_config(store, BatchUploadConfig::default())
    }

    pub fn with_config(store: AssetStore, config: BatchUploadConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BatchUploadConfig {
        &self.config
    }

    /// Upload every asset and report each outcome. One failure does not stop the others.
    pub async fn upload_settled(&self, assets: Vec<StreamAsset>) -> BatchUploadResult {
        self.run(assets, false).await
    }

    /// Upload every asset, returning them in input order. On the first failure the
    /// outstanding uploads are aborted, drained, and that failure is returned.
    pub async fn upload(&self, assets: Vec<StreamAsset>) -> Result<Vec<CloudAsset>> {
        if assets.is_empty() {
            return Err(Error::client_with_context(
                "Upload asset list is empty",
                ErrorContext::new().with_source("batch_upload"),
            ));
        }
        self.run(assets, true).await.into_assets()
    }

    async fn run(&self, assets: Vec<StreamAsset>, fail_fast: bool) -> BatchUploadResult {
        let start = Instant::now();
        let total = assets.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for (index, asset) in assets.into_iter().enumerate() {
            let store = self.store.clone();
            let semaphore = semaphore.clone();
            let timeout = self.config.task_timeout;
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return (index, Err(Error::client("upload worker pool closed"))),
                };
                let upload = store.upload_asset(asset);
                let outcome = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, upload).await {
                        Ok(r) => r,
                        Err(_) => Err(Error::client_with_context(
                            "asset upload timed out",
                            ErrorContext::new()
                                .with_source("batch_upload")
                                .with_details(format!("index {} exceeded {:?}", index, limit)),
                        )),
                    },
                    None => upload.await,
                };
                (index, outcome)
            });
        }

        let mut result = BatchUploadResult::new();
        let mut aborted = false;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(asset))) => {
                    debug!(index, asset_id = asset.asset_id(), "Batch upload item finished");
                    result.add_success(index, asset);
                }
                Ok((index, Err(e))) => {
                    warn!(index, error = %e, "Batch upload item failed");
                    result.add_failure(index, e);
                    if fail_fast && !aborted {
                        tasks.abort_all();
                        aborted = true;
                    }
                }
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    warn!(error = %join_error, "Batch upload task panicked");
                }
            }
        }

        // Tasks that never reported (aborted or panicked) count as failures.
        for index in 0..total {
            let reported = result.successes.iter().any(|(i, _)| *i == index)
                || result.failures.iter().any(|(i, _)| *i == index);
            if !reported {
                result.add_failure(
                    index,
                    Error::client_with_context(
                        "asset upload did not complete",
                        ErrorContext::new().with_source("batch_upload"),
                    ),
                );
            }
        }

        result.sort();
        result.total_processed = total;
        result.execution_time = start.elapsed();
        result
    }
}
