//! autodocs-scrape: documentation site detection and scraping
//!
//! This crate detects which documentation generator produced a site (Sphinx,
//! MkDocs, or an unrecognized generic layout), then scrapes the site with the
//! strategy matching that format, falling back to a bounded generic crawl when
//! a format-specific strategy comes up empty.

pub mod config;
pub mod detect;
pub mod fetch;
pub mod progress;
pub mod scrape;
pub mod urls;

use thiserror::Error;

/// Main error type for scraping operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error(
        "Rate limited while fetching {url}; retries exhausted. \
         Wait before retrying the scrape"
    )]
    RateLimited {
        url: String,
        /// Server-supplied Retry-After value in seconds, if one was sent
        retry_after: Option<u64>,
    },

    #[error("Failed to parse {url}: {message}")]
    Parse { url: String, message: String },

    #[error(
        "No documentation pages found at {base} using the {format} strategy \
         (generic fallback attempted: {fallback_attempted}). \
         Check that the URL points at the documentation root"
    )]
    NoPagesFound {
        base: String,
        format: DocFormat,
        fallback_attempted: bool,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Returns true if this error represents an unresolved rate limit.
    ///
    /// Rate limits must propagate to the caller instead of being masked by
    /// strategy fallback or a "no pages found" report.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ScrapeError::RateLimited { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use detect::{detect_format, DocFormat};
pub use fetch::Fetcher;
pub use progress::ProgressSink;
pub use scrape::{scrape, CancelFlag, Page, ScrapeOutcome};
pub use urls::{in_scope, normalize_url};
