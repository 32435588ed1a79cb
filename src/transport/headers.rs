//! Header names and fixed values used on outbound calls.

use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;

pub const ACCEPT: &str = "accept";
pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";
pub const LOCATION: &str = "location";
pub const RETRY_AFTER: &str = "retry-after";

pub const API_KEY: &str = "x-api-key";
pub const APP_INFO: &str = "x-api-app-info";
pub const OPS_INFO: &str = "x-dcsdk-ops-info";
/// Tracking id on platform and storage responses.
pub const REQUEST_ID: &str = "x-request-id";
/// Tracking id on identity-provider responses.
pub const DEBUG_ID: &str = "x-debug-id";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Value of the `x-api-app-info` header, fixed for the lifetime of the process.
pub static SDK_IDENTITY: Lazy<String> =
    Lazy::new(|| format!("rust-pdfservices-sdk-{}", env!("CARGO_PKG_VERSION")));

pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// First non-empty value among `names`.
pub fn header_first(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(v) = headers.get(*name).and_then(|v| v.to_str().ok()) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}
