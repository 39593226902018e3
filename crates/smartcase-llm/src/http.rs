//! Shared HTTP plumbing for provider adapters
//!
//! One client wrapper handles the concerns common to every HTTP backend:
//! the per-call deadline and the mapping from HTTP status classes to the
//! adapter error taxonomy. Adapters own everything request-shape-specific.

use std::time::Duration;

use smartcase_utils::error::AdapterError;

/// Longest error-body excerpt carried into an error message
const ERROR_BODY_LIMIT: usize = 300;

/// Shared HTTP client for adapter invocations
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `AdapterError::Misconfiguration` if the underlying client
    /// cannot be constructed.
    pub fn new() -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AdapterError::Misconfiguration(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Start building a POST request.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Execute a request with a deadline and map failures to adapter errors.
    ///
    /// Exactly one outbound call is made; there is no retry here.
    ///
    /// # Errors
    ///
    /// - `Timeout` when the deadline elapses before a response arrives
    /// - `Transport` for connectivity failures
    /// - `Auth` (401/403), `Quota` (429), `Outage` (5xx), `Api` (other
    ///   non-success) for backend-reported errors
    pub async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
        provider: &str,
    ) -> Result<reqwest::Response, AdapterError> {
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| AdapterError::Timeout { duration: timeout })?
            .map_err(|e| AdapterError::Transport(format!("{provider}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        let message = format!("{provider}: HTTP {status}: {excerpt}");

        Err(match status.as_u16() {
            401 | 403 => AdapterError::Auth(message),
            429 => AdapterError::Quota(message),
            s if s >= 500 => AdapterError::Outage(message),
            _ => AdapterError::Api(message),
        })
    }
}
