//! Defines the custom error types for the mailsweep crawler.

use std::io;
use thiserror::Error;

/// Fatal errors: anything that prevents a crawl from starting or a report
/// from being produced. Per-page fetch problems are *not* represented here,
/// they are [`FetchError`]s and stay local to the page that caused them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization of the crawl report.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error building the shared HTTP client.
    #[error("HTTP Client Error: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to extract a crawlable domain from the seed URL.
    #[error("Failed to extract domain from URL: {0}")]
    DomainExtraction(String),
}

/// Errors affecting a single page fetch. These never abort the crawl: the
/// page is recorded as visited, contributes nothing, and is not retried.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request exceeded the configured per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, or protocol failure below the HTTP layer.
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    /// The response body is not an HTML document.
    #[error("not an HTML document (content-type: {0})")]
    NonHtml(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
