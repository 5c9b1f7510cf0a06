//! MkDocs strategy: enumerate pages from `sitemap.xml`
//!
//! MkDocs sites publish a standard sitemap listing every page. When the
//! sitemap yields nothing (absent, malformed, or empty), the strategy falls
//! back to navigation-link discovery on the index page before giving up and
//! letting the dispatcher try a generic crawl.

use crate::detect::DocFormat;
use crate::fetch::Fetcher;
use crate::scrape::extract::extract_nav_links;
use crate::scrape::{fetch_pages, resolve_and_dedup, CancelFlag, ScrapeOutcome};
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// Scrapes MkDocs documentation via its sitemap
pub(super) async fn scrape_mkdocs(
    fetcher: &Fetcher,
    base_url: &Url,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome> {
    let sitemap_url = base_url.join("sitemap.xml")?;

    let mut raw_urls = Vec::new();
    match fetcher.get(&sitemap_url).await {
        Ok(result) => {
            raw_urls = parse_sitemap_locs(&result.text());
            tracing::debug!("sitemap.xml lists {} URLs", raw_urls.len());
        }
        Err(e) if e.is_rate_limited() => return Err(e),
        Err(e) => tracing::warn!("Failed to fetch sitemap.xml: {}", e),
    }

    let mut urls = resolve_and_dedup(raw_urls, base_url);

    if urls.is_empty() {
        tracing::info!("Sitemap yielded no pages; scanning index navigation links");
        let index = fetcher.get(base_url).await?;
        let nav_links = extract_nav_links(&index.text(), &index.final_url);
        urls = resolve_and_dedup(
            nav_links.into_iter().map(|u| u.to_string()),
            base_url,
        );
        tracing::debug!("Navigation discovery found {} pages", urls.len());
    }

    let (pages, failed_fetches) = fetch_pages(fetcher, urls, cancel).await?;

    Ok(ScrapeOutcome {
        format: DocFormat::MkDocs,
        pages,
        failed_fetches,
    })
}

/// Extracts `<loc>` entries from sitemap XML, in document order
///
/// Only page entries (inside `<url>` elements) are collected; `<loc>` values
/// inside `<sitemap>` elements point at nested sitemaps, which this strategy
/// does not follow. Parse errors end extraction at the failure point; the
/// entries gathered so far still count.
fn parse_sitemap_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_loc = false;
    let mut in_nested_sitemap = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = true,
                b"sitemap" => in_nested_sitemap = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = false,
                b"sitemap" => in_nested_sitemap = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_loc && !in_nested_sitemap => {
                if let Ok(value) = text.unescape() {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        urls.push(trimmed.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Sitemap XML parse error: {}", e);
                break;
            }
        }
    }

    urls
}
