//! HTTP state provider.
//!
//! This module fetches the current state from a remote endpoint that
//! serves the snapshot as JSON, such as an inventory service.

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::config::SyncConfig;
use crate::error::{Result, StateError, SyncError};

use super::provider::StateProvider;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base back-off unit in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// HTTP state provider.
#[derive(Debug, Clone)]
pub struct HttpStateProvider {
    /// HTTP client.
    client: Client,
    /// Endpoint returning the state document.
    url: String,
    /// Optional bearer token.
    token: Option<String>,
    /// Base back-off between attempts.
    retry_delay: Duration,
}

impl HttpStateProvider {
    /// Creates a new HTTP state provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a provider with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StateError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            token: None,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    /// Sets the bearer token sent with each request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the base back-off between retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Delay before the next attempt: the error's suggested delay in units
    /// of the base back-off, growing linearly with the attempt number.
    fn backoff(&self, error: &SyncError, attempt: u32) -> Duration {
        let units = error
            .retry_delay_secs()
            .and_then(|secs| u32::try_from(secs).ok())
            .unwrap_or(1);
        self.retry_delay.saturating_mul(units.saturating_mul(attempt))
    }

    /// Executes a single request.
    async fn fetch_once(&self) -> Result<SyncConfig> {
        trace!("GET {}", self.url);

        let mut request = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StateError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::State(StateError::http(status.as_u16(), body)));
        }

        response.json::<SyncConfig>().await.map_err(|e| {
            SyncError::State(StateError::corrupted(format!(
                "Failed to parse state response: {e}"
            )))
        })
    }
}

#[async_trait]
impl StateProvider for HttpStateProvider {
    async fn fetch(&self) -> Result<SyncConfig> {
        info!("Fetching state from: {}", self.url);

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.fetch_once().await {
                Ok(state) => {
                    debug!("Fetched {} resources", state.resources.len());
                    return Ok(state);
                }
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let delay = self.backoff(&e, attempt);
                    warn!("Attempt {attempt} of {MAX_RETRIES} failed: {e}; retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn provider_type(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_body() -> serde_json::Value {
        json!({
            "version": "1.0",
            "resources": [
                {"type": "server", "name": "web-1", "properties": {"region": "us-east-1"}}
            ]
        })
    }

    fn provider(server: &MockServer) -> HttpStateProvider {
        HttpStateProvider::new(format!("{}/state", server.uri()))
            .unwrap()
            .with_retry_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;

        let state = provider(&server).with_token("secret").fetch().await.unwrap();
        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].key(), "server.web-1");
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;

        let state = provider(&server).fetch().await.unwrap();
        assert_eq!(state.version, "1.0");
    }

    #[tokio::test]
    async fn test_retries_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;

        let state = provider(&server).fetch().await.unwrap();
        assert_eq!(state.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(500))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let err = provider(&server).fetch().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_backoff_follows_error_hint() {
        let provider = HttpStateProvider::new("http://localhost/state").unwrap();
        let rate_limited = SyncError::from(StateError::http(429, "slow down"));
        let unavailable = SyncError::from(StateError::http(503, "unavailable"));

        assert_eq!(provider.backoff(&rate_limited, 1), Duration::from_secs(5));
        assert_eq!(provider.backoff(&unavailable, 1), Duration::from_secs(1));
        assert_eq!(provider.backoff(&unavailable, 2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such state"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).fetch().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::State(StateError::ProviderFailed {
                status: Some(404),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch().await.unwrap_err();
        assert!(matches!(err, SyncError::State(StateError::Corrupted { .. })));
    }
}
