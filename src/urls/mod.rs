//! URL handling for the scraper
//!
//! Provides URL normalization (canonical form used for deduplication) and the
//! same-origin, same-path-prefix scope test used by the generic crawler.

mod normalize;
mod scope;

pub use normalize::normalize_url;
pub use scope::in_scope;

/// Derives a human-readable title from a URL path.
///
/// Used when a page has no `<title>` or `<h1>` to offer. The last path
/// segment is split on `-`/`_` and title-cased; the site root becomes "Home".
pub fn title_from_url(url: &url::Url) -> String {
    let path = url.path().trim_matches('/');
    if path.is_empty() {
        return "Home".to_string();
    }

    let last = path.rsplit('/').next().unwrap_or(path);
    // Drop a file extension such as .html
    let stem = last.split('.').next().unwrap_or(last);

    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
