use url::Url;

/// Checks whether a candidate URL is inside the crawl scope of a base URL
///
/// A candidate is in scope when it shares the base's scheme, host, and port,
/// and its path sits under the base's directory prefix. The prefix is the
/// base path up to and including the final `/`, so a base of
/// `https://example.com/en/latest/` scopes to `/en/latest/...` and a base of
/// `https://example.com/` scopes to the whole site.
///
/// The directory page itself (normalized without its trailing slash) also
/// counts as in scope.
pub fn in_scope(base: &Url, candidate: &Url) -> bool {
    if base.scheme() != candidate.scheme() {
        return false;
    }
    if base.host_str() != candidate.host_str() {
        return false;
    }
    if base.port_or_known_default() != candidate.port_or_known_default() {
        return false;
    }

    let prefix = dir_prefix(base.path());
    let path = candidate.path();

    path.starts_with(prefix) || path == prefix.trim_end_matches('/')
}

/// Returns the directory portion of a path, up to and including the last `/`.
fn dir_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}
