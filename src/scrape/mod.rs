//! Scraping strategies and the dispatcher that selects between them
//!
//! One strategy exists per detected format:
//! - Sphinx: pages enumerated from the `objects.inv` inventory
//! - MkDocs: pages enumerated from `sitemap.xml`, with a navigation-link
//!   fallback when the sitemap yields nothing
//! - Generic: bounded breadth-first crawl from the index page
//!
//! The dispatcher enforces the cross-strategy fallback invariant: an empty
//! primary result falls back to the generic crawl exactly once, unless the
//! emptiness stems from an unresolved rate limit, which propagates instead.

mod extract;
mod generic;
mod mkdocs;
mod sphinx;

pub use extract::{extract_content, extract_links, extract_nav_links, ExtractedPage};

use crate::config::CrawlConfig;
use crate::detect::DocFormat;
use crate::fetch::Fetcher;
use crate::urls::{normalize_url, title_from_url};
use crate::{Result, ScrapeError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// A scraped documentation page
#[derive(Debug, Clone)]
pub struct Page {
    /// Canonical URL after redirect resolution and normalization
    pub url: Url,

    /// Page title, derived from the URL path when the page offers none
    pub title: String,

    /// Extracted plain-text content
    pub content: String,

    /// Discovery order index within the outcome
    pub index: usize,
}

/// The result of a scrape run
///
/// Page URLs are unique within one outcome and ordered by discovery, not by
/// fetch completion.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// The format whose strategy produced these pages
    pub format: DocFormat,

    /// Scraped pages in discovery order
    pub pages: Vec<Page>,

    /// Pages whose URL was discovered but whose content fetch failed
    pub failed_fetches: usize,
}

/// Cooperative cancellation flag, checked at each page-fetch boundary
///
/// Cancelling mid-scrape stops before the next fetch; the pages collected so
/// far are still returned. An in-flight request runs to its own timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Scrapes a documentation site with the strategy matching `format`
///
/// # Fallback behavior
///
/// When the selected strategy produces zero pages (or fails with a parse or
/// HTTP error), the generic crawl runs exactly once before `NoPagesFound` is
/// reported. A rate-limit failure is never masked by the fallback: it
/// propagates so the caller can retry later instead of misreading the
/// situation as an empty site.
///
/// # Arguments
///
/// * `fetcher` - The shared fetcher for this run
/// * `base_url` - Documentation root, normally with a trailing slash
/// * `format` - The detected format to dispatch on
/// * `crawl` - Bounds for the generic crawl
/// * `cancel` - Cooperative cancellation flag
pub async fn scrape(
    fetcher: &Fetcher,
    base_url: &Url,
    format: DocFormat,
    crawl: &CrawlConfig,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome> {
    let primary = run_strategy(fetcher, base_url, format, crawl, cancel).await;

    match primary {
        Ok(outcome) if !outcome.pages.is_empty() => {
            fetcher.progress().report(&format!(
                "Scraped {} pages via the {} strategy ({} failed fetches)",
                outcome.pages.len(),
                outcome.format,
                outcome.failed_fetches
            ));
            return Ok(outcome);
        }
        Ok(_) => {
            tracing::warn!("{} strategy found no pages", format);
        }
        Err(e) if e.is_rate_limited() => return Err(e),
        Err(e) if format == DocFormat::Generic => return Err(e),
        Err(e) => {
            tracing::warn!("{} strategy failed: {}", format, e);
        }
    }

    if format == DocFormat::Generic {
        // Nothing left to fall back to
        return Err(ScrapeError::NoPagesFound {
            base: base_url.to_string(),
            format,
            fallback_attempted: false,
        });
    }

    fetcher.progress().report(&format!(
        "No pages found via the {} strategy; retrying with a generic crawl",
        format
    ));

    let fallback = generic::scrape_generic(fetcher, base_url, crawl, cancel).await?;
    if fallback.pages.is_empty() {
        return Err(ScrapeError::NoPagesFound {
            base: base_url.to_string(),
            format,
            fallback_attempted: true,
        });
    }

    fetcher.progress().report(&format!(
        "Generic fallback scraped {} pages ({} failed fetches)",
        fallback.pages.len(),
        fallback.failed_fetches
    ));
    Ok(fallback)
}

/// Runs the strategy matching the format
async fn run_strategy(
    fetcher: &Fetcher,
    base_url: &Url,
    format: DocFormat,
    crawl: &CrawlConfig,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome> {
    match format {
        DocFormat::Sphinx => sphinx::scrape_sphinx(fetcher, base_url, cancel).await,
        DocFormat::MkDocs => mkdocs::scrape_mkdocs(fetcher, base_url, cancel).await,
        DocFormat::Generic => generic::scrape_generic(fetcher, base_url, crawl, cancel).await,
    }
}

/// Fetches content for an ordered, deduplicated URL list
///
/// Used by the inventory and sitemap strategies, which know their full page
/// list up front. Terminal fetch failures are counted, not silently dropped;
/// rate-limit failures abort and propagate. Redirect targets that collapse
/// onto an already-scraped canonical URL are skipped to keep outcome URLs
/// unique.
pub(crate) async fn fetch_pages(
    fetcher: &Fetcher,
    urls: Vec<Url>,
    cancel: &CancelFlag,
) -> Result<(Vec<Page>, usize)> {
    let mut pages: Vec<Page> = Vec::new();
    let mut seen_canonical: HashSet<Url> = HashSet::new();
    let mut failed = 0;

    for url in urls {
        if cancel.is_cancelled() {
            tracing::info!("Scrape cancelled; returning {} pages", pages.len());
            break;
        }

        match fetcher.get(&url).await {
            Ok(result) => {
                let canonical =
                    normalize_url(result.final_url.as_str()).unwrap_or_else(|_| url.clone());
                if !seen_canonical.insert(canonical.clone()) {
                    tracing::debug!("{} resolved to already-scraped {}", url, canonical);
                    continue;
                }

                let extracted = extract_content(&result.text());
                let title = extracted
                    .title
                    .unwrap_or_else(|| title_from_url(&canonical));
                pages.push(Page {
                    url: canonical,
                    title,
                    content: extracted.text,
                    index: pages.len(),
                });
            }
            Err(e) if e.is_rate_limited() => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                failed += 1;
            }
        }
    }

    Ok((pages, failed))
}

/// Resolves raw link strings against a base, keeping the first occurrence of
/// each normalized same-host URL in order
pub(crate) fn resolve_and_dedup(raw: impl IntoIterator<Item = String>, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for candidate in raw {
        let Ok(joined) = base_url.join(candidate.trim()) else {
            tracing::debug!("Skipping unresolvable URL: {}", candidate);
            continue;
        };
        let Ok(normalized) = normalize_url(joined.as_str()) else {
            continue;
        };
        if normalized.host_str() != base_url.host_str() {
            continue;
        }
        if seen.insert(normalized.clone()) {
            urls.push(normalized);
        }
    }

    urls
}
