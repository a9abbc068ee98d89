use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Bounded-retry HTTP client for outbound calls. Retries transport errors,
/// 5xx and 429 with exponential backoff; any other status is handed back to
/// the caller untouched, since those requests will not self-heal.
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: reqwest::Client,
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryClient {
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("building http client")?;

        Ok(Self {
            client,
            max_retries,
            base_delay,
            max_delay,
        })
    }

    /// POSTs `payload` as JSON. The body is serialized once up front and the
    /// same bytes are re-sent on every attempt, so nothing depends on the
    /// request body being re-readable. Total attempts = 1 + max_retries; on
    /// exhaustion the last underlying failure is returned, wrapped once.
    pub async fn post_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<reqwest::Response> {
        let body = serde_json::to_vec(payload).context("serializing request body")?;
        let max_attempts = self.max_retries + 1;
        let mut delay = self.base_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let result = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await;

            let failure = match result {
                Ok(resp) if !retryable_status(resp.status()) => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    // Drain the failed response before the next attempt.
                    let _ = resp.bytes().await;
                    anyhow!("{url} returned {status}")
                }
                Err(e) => anyhow::Error::new(e).context(format!("POST {url}")),
            };

            if attempt >= max_attempts {
                return Err(failure.context(format!("request failed after {attempt} attempt(s)")));
            }

            warn!(
                "attempt {}/{} failed: {failure:#}, retrying in {:?}",
                attempt, max_attempts, delay
            );
            sleep(delay).await;
            delay = (delay * 2).min(self.max_delay);
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
