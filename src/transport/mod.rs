//! HTTP plumbing: request descriptors, the pooled transport, failure
//! classification and the executor that ties them together.

pub mod classifier;
pub mod executor;
pub mod headers;
pub mod http;
pub mod request;

pub use classifier::{ErrorHandler, FailedResponse, ResponseClassifier};
pub use executor::HttpExecutor;
pub use http::{HttpTransport, TransportError};
pub use request::{HttpMethod, HttpRequest, RequestBody, RequestKey};
