//! Jobs: operation catalogue, submission, polling and typed results.

mod client;
mod operation;
mod request;
mod result;
mod status;

pub use client::{JobClient, JobHandle, DEFAULT_POLL_CEILING};
pub use operation::OperationKind;
pub use request::{CallbackNotifierData, JobRequest, NotifierConfig, NotifierType};
pub use result::{JobResult, ResultMapper, ResultShape};
pub use status::{JobStatus, JobStatusResponse, PollResult, DEFAULT_RETRY_INTERVAL};
