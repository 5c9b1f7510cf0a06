//! HTML content and link extraction
//!
//! Turns a fetched documentation page into plain text plus a title, and
//! extracts hyperlinks for the navigation-fallback and generic-crawl paths.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text is never documentation content
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

/// Containers likely to hold the main documentation body, tried in order
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    ".content",
    "#content",
    ".documentation",
    "#documentation",
];

/// Navigation containers commonly used by documentation themes
const NAV_SELECTORS: &[&str] = &[
    "nav a[href]",
    ".md-nav a[href]",
    ".toctree-wrapper a[href]",
    ".sidebar a[href]",
    ".navigation a[href]",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The page title (from `<title>`, falling back to the first `<h1>`)
    pub title: Option<String>,

    /// Plain-text content with page chrome stripped
    pub text: String,
}

/// Extracts title and plain-text content from an HTML page
///
/// The main content container is located with a cascade of common selectors;
/// when none matches, the whole body is used. Script, style, and page-chrome
/// elements are skipped.
pub fn extract_content(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let root = CONTENT_SELECTORS
        .iter()
        .filter_map(|sel| Selector::parse(sel).ok())
        .find_map(|sel| document.select(&sel).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|sel| document.select(&sel).next())
        });

    let text = match root {
        Some(element) => {
            let mut parts = Vec::new();
            collect_text(element, &mut parts);
            parts.join("\n")
        }
        None => String::new(),
    };

    ExtractedPage { title, text }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    for sel in ["title", "h1"] {
        let selector = match Selector::parse(sel) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(title) = document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
        {
            return Some(title);
        }
    }
    None
}

/// Recursively collects text, skipping excluded elements
fn collect_text(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if EXCLUDED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

/// Extracts all hyperlinks from an HTML page as absolute URLs
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Extracts links from navigation containers, in document order
///
/// Falls back to every anchor on the page when no recognized navigation
/// container yields anything; bare documentation themes put their page list
/// straight into the body.
pub fn extract_nav_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for sel in NAV_SELECTORS {
        let selector = match Selector::parse(sel) {
            Ok(s) => s,
            Err(_) => continue,
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    if links.is_empty() {
        return extract_links(html, base_url);
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None for links that cannot lead to a documentation page:
/// javascript:/mailto:/tel: schemes, data URIs, fragment-only anchors, and
/// anything that is not HTTP(S) after resolution.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
