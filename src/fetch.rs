//! Page fetching with timeout, retry and browser-like headers.
//!
//! The pipeline only depends on the [`PageFetcher`] trait. [`HttpFetcher`] is
//! the network implementation; [`MemoryFetcher`] serves canned responses for
//! tests and offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use crate::encoding::decode_body;
use crate::error::{Error, Result};
use crate::url_utils::parse_http_url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Retrieves raw HTML for a URL.
///
/// Implementations must bound each attempt by `timeout` and make at most
/// `max_retries` attempts. Dropping the returned future cancels the request.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body decoded to UTF-8.
    async fn fetch(&self, url: &str, timeout: Duration, max_retries: u32) -> Result<String>;
}

/// Delay before the attempt following `attempt` (1-based): `base * 2^attempt`.
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Network fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    backoff_base: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with browser-like default headers and a 1 s backoff base.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client. Its default headers are used as-is.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Override the backoff base delay.
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(%url))]
    async fn fetch(&self, url: &str, timeout: Duration, max_retries: u32) -> Result<String> {
        if parse_http_url(url).is_none() {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        let attempts = max_retries.max(1);
        let mut last = Error::NoContent;

        for attempt in 1..=attempts {
            let outcome = match tokio::time::timeout(timeout, self.fetch_once(url)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(Error::Timeout(timeout)),
            };

            match outcome {
                Ok(html) => {
                    debug!(attempt, bytes = html.len(), "Fetched page");
                    return Ok(html);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(attempt, attempts, error = %err, "Fetch attempt failed");
                    last = err;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(backoff_delay(self.backoff_base, attempt)).await;
            }
        }

        Err(Error::RetriesExhausted {
            attempts,
            last: Box::new(last),
        })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

// === In-memory fetcher ===

/// Canned response served by [`MemoryFetcher`].
#[derive(Debug, Clone)]
pub enum MemoryResponse {
    /// A successful page body.
    Page(String),
    /// A non-2xx status.
    Status(u16),
    /// The request stalls past its timeout.
    Stall,
}

/// Fetcher that serves canned responses and counts calls.
///
/// Unknown URLs answer HTTP 404. Failures are reported as exhausted retries,
/// the same shape [`HttpFetcher`] produces.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, MemoryResponse>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    /// Empty fetcher: every URL answers 404.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page body for `url`.
    #[must_use]
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.set(url, MemoryResponse::Page(html.into()));
        self
    }

    /// Register an arbitrary response for `url`.
    #[must_use]
    pub fn with_response(self, url: &str, response: MemoryResponse) -> Self {
        self.set(url, response);
        self
    }

    /// Replace the response for `url`.
    pub fn set(&self, url: &str, response: MemoryResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), response);
    }

    /// Number of `fetch` calls served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, timeout: Duration, max_retries: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .unwrap_or(MemoryResponse::Status(404));

        let last = match response {
            MemoryResponse::Page(html) => return Ok(html),
            MemoryResponse::Status(code) => Error::HttpStatus(code),
            MemoryResponse::Stall => Error::Timeout(timeout),
        };
        Err(Error::RetriesExhausted {
            attempts: max_retries.max(1),
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(8));
        assert_eq!(backoff_delay(Duration::ZERO, 5), Duration::ZERO);
    }

    #[test]
    fn browser_headers_present() {
        let headers = browser_headers();
        assert!(headers.contains_key(header::USER_AGENT));
        assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
        assert!(headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html")));
    }

    #[tokio::test]
    async fn http_fetcher_rejects_invalid_url_without_network() {
        let fetcher = HttpFetcher::new().unwrap_or_else(|e| panic!("{e}"));
        let result = fetcher.fetch("not a url", Duration::from_millis(10), 3).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn http_fetcher_gives_up_on_stalled_server_within_budget() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        let addr = listener.local_addr().unwrap_or_else(|e| panic!("{e}"));

        // Accept connections and hold them open without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        let fetcher = HttpFetcher::with_client(client).with_backoff_base(Duration::from_millis(10));

        let started = std::time::Instant::now();
        let result = fetcher
            .fetch(&format!("http://{addr}/article"), Duration::from_millis(200), 3)
            .await;
        let elapsed = started.elapsed();
        server.abort();

        match result {
            Err(Error::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::Timeout(t) if t == Duration::from_millis(200)), "{last}");
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
        // Three 200ms attempts plus 20ms and 40ms of backoff.
        assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    }

    #[tokio::test]
    async fn memory_fetcher_serves_pages_and_counts() {
        let fetcher = MemoryFetcher::new().with_page("https://a.test/x", "<p>hi</p>");

        let page = fetcher.fetch("https://a.test/x", Duration::from_secs(1), 3).await;
        assert_eq!(page.ok().as_deref(), Some("<p>hi</p>"));

        let missing = fetcher.fetch("https://a.test/y", Duration::from_secs(1), 3).await;
        match missing {
            Err(Error::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::HttpStatus(404)));
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn memory_fetcher_stall_reports_timeout() {
        let fetcher = MemoryFetcher::new().with_response("https://a.test/slow", MemoryResponse::Stall);
        let result = fetcher.fetch("https://a.test/slow", Duration::from_millis(250), 1).await;
        match result {
            Err(Error::RetriesExhausted { last, .. }) => {
                assert!(matches!(*last, Error::Timeout(d) if d == Duration::from_millis(250)));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
