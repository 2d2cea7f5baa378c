//! Reads a source location: a local path or an HTTP(S) URL.

use std::time::Duration;

use crate::LoadError;

/// Whether `location` should be fetched over HTTP.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads the raw bytes at `location`.
///
/// URLs are fetched with a GET bounded by `timeout`; anything else is
/// read from disk.
///
/// # Errors
///
/// Returns [`LoadError`] naming `source_name` if the file cannot be read,
/// the request fails or times out, or the server answers with an error
/// status.
pub async fn read_location(
    source_name: &str,
    location: &str,
    timeout: Duration,
) -> Result<Vec<u8>, LoadError> {
    if !is_remote(location) {
        log::debug!("[{source_name}] Reading {location}");
        return tokio::fs::read(location)
            .await
            .map_err(|error| LoadError::Io {
                source_name: source_name.to_string(),
                error,
            });
    }

    log::debug!("[{source_name}] Fetching {location}");
    let http_error = |error: reqwest::Error| {
        if error.is_timeout() {
            LoadError::Timeout {
                source_name: source_name.to_string(),
                seconds: timeout.as_secs(),
            }
        } else {
            LoadError::Http {
                source_name: source_name.to_string(),
                error,
            }
        }
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_error)?;
    let response = client
        .get(location)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(http_error)?;
    let body = response.bytes().await.map_err(http_error)?;

    Ok(body.to_vec())
}
