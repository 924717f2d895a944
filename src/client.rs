//! Retrying HTTP fetcher used by the terminal client when talking to a
//! running DeepStride server.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Delay multiplied by the attempt number between retries: 1s, 2s, ...
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed with HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// POST `body` as JSON to `url` and return the parsed JSON response,
/// retrying failed attempts with linear backoff.
///
/// A non-success status, a transport error, and an unparseable response
/// body all count as failed attempts. The first success returns
/// immediately; the last attempt's error propagates. `base_delay` is a
/// parameter so tests can pass `Duration::ZERO` instead of waiting on
/// real timers.
pub async fn fetch_with_retry(
    http: &Client,
    url: &str,
    body: &Value,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<Value, FetchError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match try_fetch(http, url, body).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                warn!(attempt, error = %err, "request failed, retrying");
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
        }
    }
}

async fn try_fetch(http: &Client, url: &str, body: &Value) -> Result<Value, FetchError> {
    let response = http.post(url).json(body).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    Ok(response.json::<Value>().await?)
}
