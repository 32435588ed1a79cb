//! Typed job results and the per-shape mapping functions.

use crate::asset::CloudAsset;
use crate::{Error, ErrorContext, Result};
use serde_json::Value;

/// Layout of a finished job's body. Each shape has one pure mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    SingleAsset,
    Images,
    Split,
    Extract,
    Properties,
    Autotag,
    AccessibilityChecker,
}

pub type ResultMapper = fn(&Value) -> Result<JobResult>;

impl ResultShape {
    pub fn mapper(&self) -> ResultMapper {
        match self {
            ResultShape::SingleAsset => map_single_asset,
            ResultShape::Images => map_images,
            ResultShape::Split => map_split,
            ResultShape::Extract => map_extract,
            ResultShape::Properties => map_properties,
            ResultShape::Autotag => map_autotag,
            ResultShape::AccessibilityChecker => map_accessibility_checker,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobResult {
    Asset {
        asset: CloudAsset,
    },
    Images {
        assets: Vec<CloudAsset>,
    },
    Split {
        assets: Vec<CloudAsset>,
        asset: Option<CloudAsset>,
    },
    Extract {
        content: Option<CloudAsset>,
        resource: Option<CloudAsset>,
        /// Structured content fetched from the content asset once the job is done.
        content_json: Option<Value>,
    },
    Properties {
        metadata: Value,
    },
    Autotag {
        tagged_pdf: Option<CloudAsset>,
        report: Option<CloudAsset>,
        resource: Option<CloudAsset>,
    },
    AccessibilityChecker {
        asset: Option<CloudAsset>,
        report: Option<CloudAsset>,
    },
}

impl JobResult {
    /// Every output asset, in body order.
    pub fn assets(&self) -> Vec<&CloudAsset> {
        match self {
            JobResult::Asset { asset } => vec![asset],
            JobResult::Images { assets } => assets.iter().collect(),
            JobResult::Split { assets, asset } => assets.iter().chain(asset.iter()).collect(),
            JobResult::Extract {
                content, resource, ..
            } => content.iter().chain(resource.iter()).collect(),
            JobResult::Properties { .. } => Vec::new(),
            JobResult::Autotag {
                tagged_pdf,
                report,
                resource,
            } => tagged_pdf
                .iter()
                .chain(report.iter())
                .chain(resource.iter())
                .collect(),
            JobResult::AccessibilityChecker { asset, report } => {
                asset.iter().chain(report.iter()).collect()
            }
        }
    }

    /// The main output document, if the shape has one.
    pub fn primary_asset(&self) -> Option<&CloudAsset> {
        match self {
            JobResult::Asset { asset } => Some(asset),
            JobResult::Autotag { tagged_pdf, .. } => tagged_pdf.as_ref(),
            JobResult::AccessibilityChecker { asset, .. } => asset.as_ref(),
            JobResult::Extract { content, .. } => content.as_ref(),
            _ => self.assets().into_iter().next(),
        }
    }
}

fn asset_at(body: &Value, key: &str) -> Result<Option<CloudAsset>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| {
            Error::client_with_context(
                "unexpected asset in job result",
                ErrorContext::new()
                    .with_field_path(key)
                    .with_details(e.to_string())
                    .with_source("job_result"),
            )
        }),
    }
}

fn asset_list_at(body: &Value, key: &str) -> Result<Vec<CloudAsset>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            Error::client_with_context(
                "unexpected asset list in job result",
                ErrorContext::new()
                    .with_field_path(key)
                    .with_details(e.to_string())
                    .with_source("job_result"),
            )
        }),
    }
}

fn missing(key: &str) -> Error {
    Error::client_with_context(
        "job result is missing a required field",
        ErrorContext::new()
            .with_field_path(key)
            .with_source("job_result"),
    )
}

pub fn map_single_asset(body: &Value) -> Result<JobResult> {
    let asset = asset_at(body, "asset")?.ok_or_else(|| missing("asset"))?;
    Ok(JobResult::Asset { asset })
}

pub fn map_images(body: &Value) -> Result<JobResult> {
    Ok(JobResult::Images {
        assets: asset_list_at(body, "assetList")?,
    })
}

pub fn map_split(body: &Value) -> Result<JobResult> {
    Ok(JobResult::Split {
        assets: asset_list_at(body, "assetList")?,
        asset: asset_at(body, "asset")?,
    })
}

pub fn map_extract(body: &Value) -> Result<JobResult> {
    Ok(JobResult::Extract {
        content: asset_at(body, "content")?,
        resource: asset_at(body, "resource")?,
        content_json: None,
    })
}

pub fn map_properties(body: &Value) -> Result<JobResult> {
    let metadata = body
        .get("metadata")
        .cloned()
        .ok_or_else(|| missing("metadata"))?;
    Ok(JobResult::Properties { metadata })
}

pub fn map_autotag(body: &Value) -> Result<JobResult> {
    Ok(JobResult::Autotag {
        tagged_pdf: asset_at(body, "tagged-pdf")?,
        report: asset_at(body, "report")?,
        resource: asset_at(body, "resource")?,
    })
}

pub fn map_accessibility_checker(body: &Value) -> Result<JobResult> {
    Ok(JobResult::AccessibilityChecker {
        asset: asset_at(body, "asset")?,
        report: asset_at(body, "report")?,
    })
}
