//! Sphinx strategy: enumerate pages from the `objects.inv` inventory
//!
//! Sphinx publishes a machine-readable inventory of every documented symbol.
//! Version 2 inventories carry a short `#`-prefixed header followed by a
//! zlib-compressed body of entry lines; version 1 and hand-rolled inventories
//! keep the body as plain text. Either way, one entry line is
//! `name domain:role priority uri dispname`, and many entries point at the
//! same page via different anchors, so the resolved URLs are deduplicated
//! before fetching.

use crate::detect::DocFormat;
use crate::fetch::Fetcher;
use crate::scrape::{fetch_pages, resolve_and_dedup, CancelFlag, ScrapeOutcome};
use crate::{Result, ScrapeError};
use flate2::read::ZlibDecoder;
use std::io::Read;
use url::Url;

/// One parsed inventory entry
#[derive(Debug, Clone, PartialEq)]
struct InventoryEntry {
    name: String,
    uri: String,
}

/// Scrapes Sphinx documentation via its object inventory
pub(super) async fn scrape_sphinx(
    fetcher: &Fetcher,
    base_url: &Url,
    cancel: &CancelFlag,
) -> Result<ScrapeOutcome> {
    let inventory_url = base_url.join("objects.inv")?;
    let result = fetcher.get(&inventory_url).await?;

    let entries = parse_inventory(result.body_bytes()).map_err(|message| ScrapeError::Parse {
        url: inventory_url.to_string(),
        message,
    })?;
    tracing::debug!("Inventory lists {} entries", entries.len());

    let urls = resolve_and_dedup(
        entries.into_iter().map(|entry| entry.page_uri()),
        base_url,
    );
    tracing::info!("Inventory resolved to {} unique pages", urls.len());

    let (pages, failed_fetches) = fetch_pages(fetcher, urls, cancel).await?;

    Ok(ScrapeOutcome {
        format: DocFormat::Sphinx,
        pages,
        failed_fetches,
    })
}

impl InventoryEntry {
    /// Expands the URI shorthand: a trailing `$` stands for the entry name
    fn page_uri(&self) -> String {
        match self.uri.strip_suffix('$') {
            Some(prefix) => format!("{}{}", prefix, self.name),
            None => self.uri.clone(),
        }
    }
}

/// Parses an `objects.inv` payload into entries
///
/// Accepts version-2 inventories (zlib-compressed body) and plain-text
/// bodies. The `#`-prefixed header must carry the Sphinx inventory
/// signature; a header line mentioning zlib marks the body as compressed.
fn parse_inventory(bytes: &[u8]) -> std::result::Result<Vec<InventoryEntry>, String> {
    let mut rest = bytes;
    let mut saw_signature = false;
    let mut compressed = false;

    while rest.starts_with(b"#") {
        let newline = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| "truncated inventory header".to_string())?;
        let line = String::from_utf8_lossy(&rest[..newline]);

        if line.starts_with("# Sphinx inventory version") {
            saw_signature = true;
        }
        if line.contains("zlib") {
            compressed = true;
        }

        rest = &rest[newline + 1..];
    }

    if !saw_signature {
        return Err("missing Sphinx inventory signature".to_string());
    }

    let payload = if compressed {
        let mut decoder = ZlibDecoder::new(rest);
        let mut decoded = Vec::new();
        decoder
            .read_to_end(&mut decoded)
            .map_err(|e| format!("zlib decompression failed: {}", e))?;
        decoded
    } else {
        rest.to_vec()
    };

    let text = String::from_utf8_lossy(&payload);
    Ok(text.lines().filter_map(parse_entry).collect())
}

/// Parses one inventory entry line
///
/// Version-2 lines are `name domain:role priority uri dispname`, where both
/// the name and the display name may contain spaces; the `domain:role` token
/// followed by an integer priority anchors the split. Version-1 lines are
/// the three-token `name type uri` form.
fn parse_entry(line: &str) -> Option<InventoryEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }

    for i in 1..tokens.len().saturating_sub(2) {
        if tokens[i].contains(':') && tokens[i + 1].parse::<i32>().is_ok() {
            return Some(InventoryEntry {
                name: tokens[..i].join(" "),
                uri: tokens[i + 2].to_string(),
            });
        }
    }

    if tokens.len() == 3 {
        return Some(InventoryEntry {
            name: tokens[0].to_string(),
            uri: tokens[2].to_string(),
        });
    }

    None
}
