//! Documentation format detection
//!
//! Given a documentation base URL, decides which generator produced the site
//! by probing for format-specific artifacts, in strict priority order:
//!
//! 1. `objects.inv` present and inventory-like -> Sphinx
//! 2. `sitemap.xml` present and well-formed sitemap XML -> MkDocs
//! 3. Generator markers in the index page HTML -> Sphinx or MkDocs
//! 4. Otherwise -> Generic
//!
//! A rate-limit failure during any probe propagates as a detection failure.
//! It must never be downgraded to Generic: the correct signal for the caller
//! is "retry later", not a mis-detected format that scrapes zero pages.

use crate::fetch::{FetchResult, Fetcher};
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt;
use url::Url;

/// The documentation generator behind a site
///
/// A closed set: each variant has exactly one scraping strategy, and the
/// dispatcher matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocFormat {
    /// Sphinx: publishes an `objects.inv` inventory of documented symbols
    Sphinx,
    /// MkDocs: publishes a `sitemap.xml` listing all pages
    MkDocs,
    /// Unrecognized generator; scraped with a bounded generic crawl
    Generic,
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFormat::Sphinx => write!(f, "Sphinx"),
            DocFormat::MkDocs => write!(f, "MkDocs"),
            DocFormat::Generic => write!(f, "generic"),
        }
    }
}

/// Detects the documentation format for a base URL
///
/// Probes run in strict priority order and the first match wins; once a
/// format is classified no further checks run. Each probe uses the fetcher's
/// HEAD-then-GET fallback where a body is not required.
///
/// # Arguments
///
/// * `fetcher` - The shared fetcher for this run
/// * `base_url` - Documentation root, normally with a trailing slash
///
/// # Returns
///
/// * `Ok(DocFormat)` - The detected format (Generic when nothing matched)
/// * `Err(ScrapeError)` - A rate limit that retries could not resolve
pub async fn detect_format(fetcher: &Fetcher, base_url: &Url) -> Result<DocFormat> {
    // 1. objects.inv (Sphinx)
    let inventory_url = base_url.join("objects.inv")?;
    match fetcher.probe(&inventory_url).await {
        Ok(result) => {
            if looks_like_inventory(&result) {
                return Ok(DocFormat::Sphinx);
            }
            tracing::debug!("objects.inv exists but does not look like an inventory");
        }
        Err(e) if e.is_rate_limited() => return Err(e),
        Err(e) => tracing::debug!("objects.inv probe failed: {}", e),
    }

    // 2. sitemap.xml (MkDocs)
    let sitemap_url = base_url.join("sitemap.xml")?;
    match fetcher.get(&sitemap_url).await {
        Ok(result) => {
            if is_sitemap_xml(&result.text()) {
                return Ok(DocFormat::MkDocs);
            }
            tracing::debug!("sitemap.xml exists but is not well-formed sitemap XML");
        }
        Err(e) if e.is_rate_limited() => return Err(e),
        Err(e) => tracing::debug!("sitemap.xml probe failed: {}", e),
    }

    // 3. Generator markers in the index page
    match fetcher.get(base_url).await {
        Ok(result) => {
            if let Some(format) = sniff_generator_markers(&result.text()) {
                return Ok(format);
            }
        }
        Err(e) if e.is_rate_limited() => return Err(e),
        Err(e) => tracing::debug!("index page probe failed: {}", e),
    }

    Ok(DocFormat::Generic)
}

/// Checks whether a probe result plausibly is a Sphinx object inventory
///
/// A HEAD success carries no body; its 2xx status is taken at face value. A
/// GET body must carry the inventory signature, a plain-text content type, or
/// a zlib-compressed payload.
fn looks_like_inventory(result: &FetchResult) -> bool {
    let Some(body) = result.body.as_deref() else {
        // HEAD succeeded; nothing more to inspect
        return true;
    };

    if body.starts_with(b"# Sph") {
        return true;
    }

    // zlib streams start with 0x78 (deflate, 32K window)
    if body.first() == Some(&0x78) {
        return true;
    }

    result
        .content_type()
        .map(|ct| ct.to_ascii_lowercase().contains("text/plain"))
        .unwrap_or(false)
}

/// Checks whether a body is well-formed XML with a sitemap root element
fn is_sitemap_xml(text: &str) -> bool {
    let mut reader = Reader::from_str(text);
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if !saw_root => {
                if !matches!(e.local_name().as_ref(), b"urlset" | b"sitemapindex") {
                    return false;
                }
                saw_root = true;
            }
            Ok(Event::Eof) => return saw_root,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

/// Looks for generator markers in index page HTML
fn sniff_generator_markers(html: &str) -> Option<DocFormat> {
    let lowered = html.to_ascii_lowercase();

    if lowered.contains("sphinxdoc")
        || lowered.contains("sphinx_rtd_theme")
        || lowered.contains("generated by sphinx")
    {
        return Some(DocFormat::Sphinx);
    }

    if lowered.contains("mkdocs") {
        return Some(DocFormat::MkDocs);
    }

    None
}
