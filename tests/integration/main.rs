//! Integration tests with mock HTTP server

pub mod mock_server;

mod assets;
mod http_retry;
mod jobs;
