use std::time::Duration;

use futures::StreamExt;
use reqwest::redirect::Policy;
use thiserror::Error;

use super::document::{decode, LoadError, DEFAULT_MAX_DOCUMENT_BYTES};
use super::model::Feed;
use crate::util::{validate_fetch_url, UrlValidationError};

/// Errors that can occur while retrieving a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is malformed or points somewhere we refuse to fetch
    #[error("Refused URL: {0}")]
    Url(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(u64),
    /// Received fewer bytes than Content-Length announced
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// How remote documents are retrieved.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    /// First backoff delay; each retry doubles it.
    pub retry_base_delay: Duration,
    pub max_document_bytes: u64,
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            allow_private_hosts: false,
        }
    }
}

impl FetchConfig {
    /// Redirect hops followed before a request fails.
    const MAX_REDIRECTS: usize = 3;

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Redirect policy that re-validates every hop.
    ///
    /// - At most [`Self::MAX_REDIRECTS`] hops
    /// - A URL already visited in the chain is a loop
    /// - Each target must pass [`validate_fetch_url`] with the same
    ///   `allow_private_hosts` setting as the first request
    pub fn redirect_policy(&self) -> Policy {
        let allow_private_hosts = self.allow_private_hosts;
        Policy::custom(move |attempt| {
            if attempt.previous().len() >= Self::MAX_REDIRECTS {
                return attempt.error("Too many redirects");
            }

            let url = attempt.url();
            if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
                return attempt.error("Redirect loop detected");
            }

            if let Err(e) = validate_fetch_url(url.as_str(), allow_private_hosts) {
                tracing::warn!(to = %url, error = %e, "Refusing redirect");
                return attempt.error(e);
            }

            tracing::debug!(
                from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
                to = %url,
                hop = attempt.previous().len() + 1,
                "Following redirect"
            );
            attempt.follow()
        })
    }

    /// An HTTP client bounded by this configuration: total request timeout
    /// and [`Self::redirect_policy`].
    pub fn build_client(&self, user_agent: &str) -> Result<reqwest::Client, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(self.redirect_policy())
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }
}

/// Downloads a document and returns its raw bytes.
///
/// # Behavior
///
/// - The URL must pass [`validate_fetch_url`]
/// - Sending a request and reading its body are each bounded by
///   `config.timeout`, whatever timeout `client` itself carries
/// - Redirects are only re-validated when `client` was built by
///   [`FetchConfig::build_client`]
/// - 429 and 5xx responses are retried with exponential backoff, up to
///   `config.max_retries` times; other non-2xx statuses fail immediately
/// - Bodies larger than `config.max_document_bytes` are rejected, both from
///   `Content-Length` and while streaming
/// - A body shorter than its `Content-Length` is retried like a 5xx
///
/// # Errors
///
/// See [`FetchError`].
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    config: &FetchConfig,
) -> Result<Vec<u8>, FetchError> {
    let url = validate_fetch_url(url, config.allow_private_hosts)?;
    let mut retry_count = 0;

    loop {
        let response = tokio::time::timeout(config.timeout, client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            if retry_count >= config.max_retries {
                return Err(if status.is_server_error() {
                    FetchError::HttpStatus(status.as_u16())
                } else {
                    FetchError::RateLimited(config.max_retries)
                });
            }

            let delay = config.backoff(retry_count);
            tracing::warn!(
                url = %url,
                status = %status,
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "Retryable response, backing off"
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = tokio::time::timeout(
            config.timeout,
            read_limited_bytes(response, config.max_document_bytes),
        )
        .await
        .map_err(|_| FetchError::Timeout)?;

        match body {
            Ok(bytes) => {
                tracing::debug!(url = %url, bytes = bytes.len(), "Fetched document");
                return Ok(bytes);
            }
            Err(FetchError::IncompleteResponse { expected, received })
                if retry_count < config.max_retries =>
            {
                let delay = config.backoff(retry_count);
                tracing::debug!(
                    url = %url,
                    expected = expected,
                    received = received,
                    attempt = retry_count + 1,
                    "Retrying incomplete download"
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Downloads and decodes a remote feed.
pub async fn load_remote(
    client: &reqwest::Client,
    url: &str,
    config: &FetchConfig,
) -> Result<Feed, LoadError> {
    let bytes = fetch_document(client, url, config)
        .await
        .map_err(|e| LoadError::Unavailable(e.to_string()))?;
    Ok(decode(&bytes)?)
}

async fn read_limited_bytes(response: reqwest::Response, limit: u64) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if expected_length.is_some_and(|len| len > limit) {
        return Err(FetchError::ResponseTooLarge(limit));
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if (bytes.len() as u64).saturating_add(chunk.len() as u64) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
