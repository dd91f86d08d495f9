//! Error types for rs-newsextract.
//!
//! Errors never cross the pipeline boundary: every phase catches its own
//! failure and the orchestrator turns it into a fallback reason. These types
//! are what the individual components (fetcher, extractors) report.

use std::time::Duration;

/// Error type for fetch and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (DNS, TLS, connection reset, body read).
    #[error("Network request failed: {0}")]
    Network(String),

    /// The request did not complete before the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {0}")]
    HttpStatus(u16),

    /// Every retry attempt failed; carries the last underlying failure.
    #[error("Fetch failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The final attempt's error.
        last: Box<Error>,
    },

    /// Structured data (JSON-LD, feed JSON) could not be parsed.
    #[error("Parsing failed: {0}")]
    Parse(String),

    /// The source URL is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No extractable content was found in the document.
    #[error("No extractable content found")]
    NoContent,
}

impl Error {
    /// Whether a fetch attempt that failed with this error may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::HttpStatus(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus(status.as_u16());
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias for fetch and extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
