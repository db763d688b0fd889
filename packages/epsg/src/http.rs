//! HTTP client wrapper for talking to the EPSG registry service.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;

use crate::config::{MAX_RETRIES, RETRY_BASE_DELAY_MS};
use crate::error::{EpsgError, Result};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("epsg-registry/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET `url` with retry logic, refusing bodies larger than `max_bytes`.
pub fn download_bytes(client: &Client, url: &str, max_bytes: u64) -> Result<Vec<u8>> {
    send_with_retry(url, max_bytes, || client.get(url))
}

/// POST an XML document to `url` with retry logic.
pub fn post_xml(client: &Client, url: &str, body: &str, max_bytes: u64) -> Result<Vec<u8>> {
    send_with_retry(url, max_bytes, || {
        client
            .post(url)
            .header(CONTENT_TYPE, "application/xml")
            .body(body.to_string())
    })
}

/// Send the request built by `request` until it succeeds.
///
/// Uses exponential backoff for transient failures (connection errors,
/// timeouts, 5xx responses). Client errors are returned immediately.
fn send_with_retry(
    url: &str,
    max_bytes: u64,
    request: impl Fn() -> RequestBuilder,
) -> Result<Vec<u8>> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match request().send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    tracing::warn!(
                        url,
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                let response = response.error_for_status()?;
                if response.content_length().is_some_and(|len| len > max_bytes) {
                    return Err(EpsgError::ResponseTooLarge {
                        url: url.to_string(),
                        max_bytes,
                    });
                }
                let bytes = response.bytes()?;
                // Content-Length may be absent (chunked encoding)
                if bytes.len() as u64 > max_bytes {
                    return Err(EpsgError::ResponseTooLarge {
                        url: url.to_string(),
                        max_bytes,
                    });
                }
                tracing::debug!(url, bytes = bytes.len(), "Received response");
                return Ok(bytes.to_vec());
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(EpsgError::Http(e));
            }
        }
    }

    Err(EpsgError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Decode a response body as UTF-8, replacing invalid sequences.
pub fn bytes_to_string(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        std::borrow::Cow::Borrowed(text) => text.to_string(),
        std::borrow::Cow::Owned(text) => {
            tracing::warn!(bytes = bytes.len(), "Response is not valid UTF-8, replaced invalid sequences");
            text
        }
    }
}
