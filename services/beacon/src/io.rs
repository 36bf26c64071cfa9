//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

/// Timeout applied to every outgoing destination request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a POST request with form-encoded body
    async fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> crate::Result<HttpResponse>;

    /// Send a POST request with a pre-serialized body
    async fn post_body(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl ReqwestHttpClient {
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn finish(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
        headers: &[(&str, &str)],
    ) -> crate::Result<HttpResponse> {
        let request = headers
            .iter()
            .fold(request, |request, (name, value)| request.header(*name, *value));

        let response = request
            .send()
            .await
            .map_err(|e| crate::BeaconError::Http(format!("POST {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::BeaconError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("POST form {}", url);
        let request = self.client.post(url).form(params);
        self.finish(url, request, headers).await
    }

    async fn post_body(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {} ({} bytes)", url, body.len());
        let request = self.client.post(url).body(body.to_string());
        self.finish(url, request, headers).await
    }
}
