//! # pdf-services-rust
//!
//! 云端 PDF 服务的异步 Rust 客户端：鉴权、作业提交与轮询、资产上传下载。
//!
//! Async client for cloud PDF Services. All document processing happens
//! server-side; this crate orchestrates the HTTP interactions around it.
//!
//! ## Overview
//!
//! - **Authentication**: OAuth client-credentials tokens, cached and refreshed
//!   under a per-authenticator lock so concurrent callers trigger one refresh
//! - **Execution**: every call goes through [`transport::HttpExecutor`], which
//!   attaches credentials, classifies failures and re-authenticates at most once
//! - **Jobs**: submit an operation, then poll its location until it is done or
//!   failed, with unbounded, bounded and cancellable entry points
//! - **Assets**: upload, batch upload over a bounded worker pool, download,
//!   refresh and delete
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_services_rust::auth::ServicePrincipalCredentials;
//! use pdf_services_rust::job::{JobRequest, OperationKind};
//! use pdf_services_rust::PdfServices;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> pdf_services_rust::Result<()> {
//!     let services = PdfServices::builder()
//!         .credentials(ServicePrincipalCredentials::from_env()?)
//!         .build()?;
//!
//!     let input = services
//!         .upload(std::fs::read("in.pdf")?, "application/pdf")
//!         .await?;
//!     let request = JobRequest::new(
//!         OperationKind::CompressPdf,
//!         &json!({ "assetID": input.asset_id() }),
//!     )?;
//!     let handle = services.submit(&request).await?;
//!     let outcome = services.get_job_result(&handle).await?;
//!     if let Some(asset) = outcome.result().and_then(|r| r.primary_asset()) {
//!         services.save_content(asset, "out.pdf").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Timeouts, region, proxy and base URI |
//! | [`auth`] | Credentials, session tokens and authenticators |
//! | [`transport`] | Request descriptors, HTTP execution and failure classification |
//! | [`job`] | Operation catalogue, submission, polling and typed results |
//! | [`asset`] | Asset references, uploads, downloads and batch uploads |
//! | [`client`] | The [`PdfServices`] facade and its builder |

pub mod asset;
pub mod auth;
pub mod client;
pub mod config;
pub mod job;
pub mod transport;

// Re-export main types for convenience
pub use client::{PdfServices, PdfServicesBuilder};
pub use config::{ClientConfig, ClientConfigBuilder, Region};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind, ServiceErrorDetails};
