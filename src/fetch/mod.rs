//! HTTP fetching for the scraper
//!
//! This module contains all outbound HTTP plumbing:
//! - Building the HTTP client with a proper user agent string
//! - GET/HEAD requests with manual, bounded redirect following
//! - HEAD-then-GET probing for servers that reject HEAD
//! - Rate-limit (HTTP 429) retries with exponential backoff, honoring a
//!   server-supplied Retry-After delay
//! - A shared per-host backoff gate so every fetch in a run respects an
//!   active throttle

mod backoff;
mod client;
mod fetcher;

pub use backoff::RateLimiter;
pub use client::build_http_client;
pub use fetcher::{FetchResult, Fetcher};
