//! Fetches individual pages over HTTP for the crawl engine.

use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::error::{FetchError, Result};

/// Builds the HTTP client shared by every fetch in a run.
pub(crate) fn build_http_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout)
        .build()?;
    Ok(client)
}

/// Fetches one page and returns its HTML body.
///
/// Anything that keeps the page from yielding HTML is a [`FetchError`]:
/// timeouts, connection failures, non-success statuses, and non-HTML
/// content types. Callers treat all of these the same way, the page is
/// skipped and never retried.
pub(crate) async fn fetch_page(
    http_client: &Client,
    url: &str,
    request_timeout: Duration,
) -> std::result::Result<String, FetchError> {
    tracing::debug!(target: "fetch_task", "Attempting to GET: {}", url);

    let response = http_client
        .get(url)
        .timeout(request_timeout)
        .send()
        .await?;

    let status = response.status();
    tracing::debug!(target: "fetch_task", "GET {} status: {}", url, status);

    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if !content_type.contains("html") {
        return Err(FetchError::NonHtml(content_type));
    }

    Ok(response.text().await?)
}
