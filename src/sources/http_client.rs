//! Async HTTP client wrapping reqwest.
//!
//! Not a browser — just GET requests with a per-call timeout and a bounded
//! retry on 5xx. The static source's feed pages sit behind a CDN that
//! occasionally serves transient 502s; one retry papers over most of them.

use crate::sources::SourceError;
use std::time::Duration;

const MAX_RETRIES: u32 = 2;

/// A fetched page body plus its final status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// HTTP client for the static source's feed pages.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with a standard Chrome user-agent and a fixed
    /// per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    /// Fetch one page, retrying on 5xx with a short backoff.
    ///
    /// A non-success final status is an error: a feed page that answers 404
    /// carries no results and must degrade like a network failure.
    pub async fn get(&self, url: &str) -> Result<FetchedPage, SourceError> {
        let mut retries = 0u32;

        loop {
            let response = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| classify(url, &e))?;

            let status = response.status().as_u16();

            if status >= 500 && retries < MAX_RETRIES {
                retries += 1;
                let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                tokio::time::sleep(delay).await;
                continue;
            }

            if !(200..300).contains(&status) {
                return Err(SourceError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| SourceError::fetch(url, format!("body read failed: {e}")))?;

            return Ok(FetchedPage { status, body });
        }
    }
}

fn classify(url: &str, error: &reqwest::Error) -> SourceError {
    let reason = if error.is_timeout() {
        format!("timeout: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        format!("request failed: {error}")
    };
    SourceError::fetch(url, reason)
}
