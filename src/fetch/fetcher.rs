//! HTTP fetcher implementation
//!
//! One `Fetcher` is constructed per run and shared by format detection and
//! every scraping strategy. Request flow:
//!
//! 1. Wait out any backoff in effect for the target host
//! 2. Send the request, following redirects manually (bounded hops, loop
//!    detection, canonical URL tracking)
//! 3. On HTTP 429, register the throttle with the shared limiter, report the
//!    wait through the progress sink, and retry up to the attempt limit
//! 4. Any other non-2xx status is a terminal failure, not retried

use crate::config::Config;
use crate::fetch::backoff::RateLimiter;
use crate::fetch::client::build_http_client;
use crate::progress::ProgressSink;
use crate::{Result, ScrapeError};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Outcome of one successful (2xx) fetch
#[derive(Debug)]
pub struct FetchResult {
    /// Final URL after redirect resolution
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Response body; `None` for HEAD responses
    pub body: Option<Vec<u8>>,
}

impl FetchResult {
    /// Content-Type header value, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Body bytes, empty for HEAD responses
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.body_bytes())
    }
}

/// Result of a single send, before retry handling
enum Sent {
    Done(FetchResult),
    Throttled {
        url: String,
        retry_after: Option<u64>,
    },
}

/// HTTP fetcher with retry, redirect, and rate-limit handling
pub struct Fetcher {
    client: Client,
    max_redirects: u32,
    max_retry_attempts: u32,
    limiter: RateLimiter,
    progress: Arc<dyn ProgressSink>,
}

impl Fetcher {
    /// Creates a fetcher from the run configuration
    pub fn new(config: &Config, progress: Arc<dyn ProgressSink>) -> Result<Self> {
        let client = build_http_client(&config.fetch, &config.user_agent)?;
        let limiter = RateLimiter::new(
            Duration::from_millis(config.fetch.backoff_base_ms),
            Duration::from_secs(config.fetch.backoff_max_secs),
        );

        Ok(Self {
            client,
            max_redirects: config.fetch.max_redirects,
            max_retry_attempts: config.fetch.max_retry_attempts,
            limiter,
            progress,
        })
    }

    /// The progress sink this fetcher reports through
    pub fn progress(&self) -> &Arc<dyn ProgressSink> {
        &self.progress
    }

    /// Fetches a URL with GET
    pub async fn get(&self, url: &Url) -> Result<FetchResult> {
        self.request(Method::GET, url).await
    }

    /// Fetches a URL with HEAD (no body)
    pub async fn head(&self, url: &Url) -> Result<FetchResult> {
        self.request(Method::HEAD, url).await
    }

    /// Probes a URL: HEAD first, with exactly one GET fallback
    ///
    /// Some servers reject HEAD outright (405, or a dropped connection), so a
    /// failed HEAD is retried once as GET before the failure is surfaced. A
    /// rate-limit failure is not retried as GET; it propagates so the caller
    /// sees the throttle instead of a misleading secondary error.
    pub async fn probe(&self, url: &Url) -> Result<FetchResult> {
        match self.head(url).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_rate_limited() => Err(e),
            Err(head_err) => {
                tracing::debug!("HEAD failed for {} ({}), retrying as GET", url, head_err);
                self.get(url).await
            }
        }
    }

    /// Sends a request, retrying rate-limited responses up to the attempt
    /// limit
    async fn request(&self, method: Method, url: &Url) -> Result<FetchResult> {
        let host = host_key(url);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            // Honor any backoff in effect for this host before starting
            if let Some(wait) = self.limiter.delay_before_start(&host) {
                tokio::time::sleep(wait).await;
            }

            match self.send_once(method.clone(), url).await? {
                Sent::Done(result) => {
                    self.limiter.record_success(&host);
                    return Ok(result);
                }
                Sent::Throttled {
                    url: hit_url,
                    retry_after,
                } => {
                    let delay = self
                        .limiter
                        .record_throttle(&host, retry_after.map(Duration::from_secs));

                    if attempt >= self.max_retry_attempts {
                        tracing::warn!(
                            "Rate limit on {} not resolved after {} attempts",
                            hit_url,
                            attempt
                        );
                        return Err(ScrapeError::RateLimited {
                            url: hit_url,
                            retry_after,
                        });
                    }

                    let source = match retry_after {
                        Some(secs) => format!("Retry-After header ({}s)", secs),
                        None => "exponential backoff".to_string(),
                    };
                    self.progress.report(&format!(
                        "Rate limited by {}; waiting {:?} before retry {}/{} ({})",
                        host,
                        delay,
                        attempt + 1,
                        self.max_retry_attempts,
                        source
                    ));
                }
            }
        }
    }

    /// Sends one request, following redirects manually
    async fn send_once(&self, method: Method, url: &Url) -> Result<Sent> {
        let mut current = url.clone();
        let mut visited: Vec<Url> = Vec::new();

        for _ in 0..=self.max_redirects {
            let response = self
                .client
                .request(method.clone(), current.clone())
                .send()
                .await
                .map_err(|e| classify_send_error(e, &current))?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = parse_retry_after(response.headers());
                return Ok(Sent::Throttled {
                    url: current.to_string(),
                    retry_after,
                });
            }

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| ScrapeError::Parse {
                        url: current.to_string(),
                        message: format!("redirect ({}) without a Location header", status),
                    })?;

                let next = current.join(location)?;
                if next == current || visited.contains(&next) {
                    return Err(ScrapeError::RedirectLoop {
                        url: next.to_string(),
                    });
                }

                tracing::trace!("Redirect {} -> {}", current, next);
                visited.push(current);
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(ScrapeError::HttpStatus {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            let headers = response.headers().clone();
            let body = if method == Method::HEAD {
                None
            } else {
                let bytes = response.bytes().await.map_err(|e| ScrapeError::Http {
                    url: current.to_string(),
                    source: e,
                })?;
                Some(bytes.to_vec())
            };

            return Ok(Sent::Done(FetchResult {
                final_url: current,
                status: status.as_u16(),
                headers,
                body,
            }));
        }

        Err(ScrapeError::TooManyRedirects {
            url: url.to_string(),
        })
    }
}

/// Classifies a transport-level send error
fn classify_send_error(error: reqwest::Error, url: &Url) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Parses a Retry-After header as delta-seconds
///
/// HTTP-date values and garbage are ignored; the caller falls back to
/// exponential backoff.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Backoff key for a URL: host plus effective port
fn host_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
