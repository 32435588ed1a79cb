//! 资产：云端资产、外部存储资产与内存中的字节流。
//!
//! Assets: service-held cloud assets, externally stored assets and in-memory
//! byte payloads, plus the storage calls that move bytes between them.

pub mod batch;
mod media_type;
pub mod store;

pub use batch::{BatchUploadConfig, BatchUploadResult, BatchUploader};
pub use media_type::MediaType;
pub use store::{AssetStore, UploadUri};

use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Reference to content held by the service. The id is assigned by the upload flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloudAsset {
    #[serde(rename = "assetID")]
    asset_id: String,
    #[serde(rename = "downloadUri", default, skip_serializing_if = "Option::is_none")]
    download_uri: Option<String>,
}

impl CloudAsset {
    pub fn new(asset_id: impl Into<String>, download_uri: Option<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            download_uri,
        }
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Short-lived signed URI, when known.
    pub fn download_uri(&self) -> Option<&str> {
        self.download_uri.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExternalStorageType {
    Sharepoint,
    S3,
    Dropbox,
    Blob,
}

/// Content addressed by a caller-supplied URI in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAsset {
    uri: String,
    #[serde(rename = "storage", default, skip_serializing_if = "Option::is_none")]
    storage_type: Option<ExternalStorageType>,
}

impl ExternalAsset {
    pub fn new(uri: impl Into<String>, storage_type: Option<ExternalStorageType>) -> Result<Self> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(Error::client_with_context(
                "External asset URI can not be empty",
                ErrorContext::new().with_field_path("uri"),
            ));
        }
        Ok(Self { uri, storage_type })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn storage_type(&self) -> Option<ExternalStorageType> {
        self.storage_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Cloud(CloudAsset),
    External(ExternalAsset),
}

impl Asset {
    /// JSON reference used inside operation payloads.
    pub fn to_input_json(&self) -> Value {
        match self {
            Asset::Cloud(a) => json!({ "assetID": a.asset_id() }),
            Asset::External(a) => match a.storage_type() {
                Some(storage) => json!({ "uri": a.uri(), "storage": storage }),
                None => json!({ "uri": a.uri() }),
            },
        }
    }

    pub(crate) fn require_cloud(&self) -> Result<&CloudAsset> {
        match self {
            Asset::Cloud(a) => Ok(a),
            Asset::External(_) => Err(Error::client_with_context(
                "Invalid asset: operation is only supported for cloud assets",
                ErrorContext::new().with_source("asset_store"),
            )),
        }
    }
}

impl From<CloudAsset> for Asset {
    fn from(a: CloudAsset) -> Self {
        Asset::Cloud(a)
    }
}

impl From<ExternalAsset> for Asset {
    fn from(a: ExternalAsset) -> Self {
        Asset::External(a)
    }
}

/// Bytes with their media type, in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamAsset {
    bytes: Bytes,
    media_type: String,
}

impl StreamAsset {
    pub fn new(bytes: impl Into<Bytes>, media_type: impl Into<String>) -> Result<Self> {
        let media_type = media_type.into();
        if media_type.trim().is_empty() {
            return Err(Error::client_with_context(
                "Media type can not be empty",
                ErrorContext::new().with_field_path("mediaType"),
            ));
        }
        Ok(Self {
            bytes: bytes.into(),
            media_type,
        })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
