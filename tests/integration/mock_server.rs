//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use pdf_services_rust::auth::{ServicePrincipalCredentials, StaticTokenCredentials};
use pdf_services_rust::transport::{HttpExecutor, HttpTransport};
use pdf_services_rust::{ClientConfig, PdfServices};
use std::sync::Arc;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client config pointing every endpoint at the mock server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::builder()
            .pdf_services_uri(&self.base_url)
            .connect_timeout_ms(2_000)
            .read_timeout_ms(5_000)
            .build()
            .expect("valid test config")
    }

    pub fn credentials(&self) -> ServicePrincipalCredentials {
        ServicePrincipalCredentials::new(CLIENT_ID, CLIENT_SECRET).expect("valid credentials")
    }

    pub fn executor(&self) -> HttpExecutor {
        let transport = HttpTransport::new(&self.config()).expect("transport");
        HttpExecutor::new(Arc::new(transport))
    }

    pub fn services(&self) -> PdfServices {
        PdfServices::builder()
            .credentials(self.credentials())
            .config(self.config())
            .build()
            .expect("client")
    }

    pub fn static_token_services(&self, token: &str) -> PdfServices {
        PdfServices::builder()
            .credentials(StaticTokenCredentials::new(CLIENT_ID, token).expect("valid credentials"))
            .config(self.config())
            .build()
            .expect("client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Identity endpoint issuing `token`, expected to be hit exactly `hits` times
    pub async fn mock_token(&mut self, token: &str, expires_in: u64, hits: usize) -> Mock {
        self.server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), CLIENT_ID.into()),
                Matcher::UrlEncoded("client_secret".into(), CLIENT_SECRET.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"{}","token_type":"bearer","expires_in":{}}}"#,
                token, expires_in
            ))
            .expect(hits)
            .create_async()
            .await
    }

    /// Identity endpoint that accepts any number of token requests
    pub async fn mock_token_any(&mut self) -> Mock {
        self.server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"session-token","expires_in":86400}"#)
            .expect_at_least(0)
            .create_async()
            .await
    }

    /// Create a mock for a successful JSON response
    pub async fn mock_json_response(
        &mut self,
        method: &str,
        path: &str,
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
