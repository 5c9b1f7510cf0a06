//! Generic strategy: bounded breadth-first crawl
//!
//! Used when no format-specific artifact exists, and as the fallback when a
//! format-specific strategy comes up empty. Starting from the index page,
//! hyperlinks are followed breadth-first, restricted to same-origin URLs
//! under the base path prefix, bounded by a page budget and a depth limit.

use crate::config::CrawlConfig;
use crate::detect::DocFormat;
use crate::fetch::Fetcher;
use crate::scrape::extract::{extract_content, extract_links};
use crate::scrape::{CancelFlag, Page, ScrapeOutcome};
use crate::urls::{in_scope, normalize_url, title_from_url};
use crate::Result;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Crawls a documentation site breadth-first within its path scope
pub(super) async fn scrape_generic(
    fetcher: &Fetcher,
    base_url: &Url,
    crawl: &CrawlConfig,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome> {
    let start = normalize_url(base_url.as_str())?;

    let mut visited: HashSet<Url> = HashSet::new();
    let mut queue: VecDeque<(Url, u32)> = VecDeque::from([(start, 0)]);
    let mut pages: Vec<Page> = Vec::new();
    let mut failed_fetches = 0;

    while let Some((url, depth)) = queue.pop_front() {
        if pages.len() >= crawl.max_pages {
            tracing::info!("Reached the {}-page crawl budget", crawl.max_pages);
            break;
        }
        if cancel.is_cancelled() {
            tracing::info!("Crawl cancelled; returning {} pages", pages.len());
            break;
        }
        if !visited.insert(url.clone()) {
            continue;
        }

        let result = match fetcher.get(&url).await {
            Ok(result) => result,
            Err(e) if e.is_rate_limited() => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                failed_fetches += 1;
                continue;
            }
        };

        // Redirects may land on a page that was already crawled under its
        // canonical URL
        let canonical = normalize_url(result.final_url.as_str()).unwrap_or_else(|_| url.clone());
        if canonical != url && !visited.insert(canonical.clone()) {
            continue;
        }

        let html = result.text();
        let extracted = extract_content(&html);
        let title = extracted
            .title
            .unwrap_or_else(|| title_from_url(&canonical));
        pages.push(Page {
            url: canonical.clone(),
            title,
            content: extracted.text,
            index: pages.len(),
        });

        if depth < crawl.max_depth {
            for link in extract_links(&html, &canonical) {
                let Ok(normalized) = normalize_url(link.as_str()) else {
                    continue;
                };
                if in_scope(base_url, &normalized) && !visited.contains(&normalized) {
                    queue.push_back((normalized, depth + 1));
                }
            }
        }
    }

    Ok(ScrapeOutcome {
        format: DocFormat::Generic,
        pages,
        failed_fetches,
    })
}
