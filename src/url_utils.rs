//! URL Utility Functions
//!
//! URL validation, resolution against an article's origin, and the
//! normalization used for result-cache keys.

use url::Url;

use crate::patterns::TRACKING_PARAM;

/// Parse `s` as an absolute http(s) URL with a host.
///
/// # Returns
/// * `Some(Url)` if valid absolute URL, `None` otherwise
#[must_use]
pub fn parse_http_url(s: &str) -> Option<Url> {
    Url::parse(s.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

/// Resolve a possibly-relative URL against `base`.
///
/// Protocol-relative (`//cdn...`), root-relative and path-relative forms are
/// all handled. Returns `None` for `data:`/`javascript:` URLs and for results
/// that are not http(s).
#[must_use]
pub fn resolve_url(url_str: &str, base: Option<&Url>) -> Option<String> {
    let url_str = url_str.trim();

    if url_str.is_empty()
        || url_str.starts_with("data:")
        || url_str.starts_with("javascript:")
        || url_str.starts_with("mailto:")
    {
        return None;
    }

    if let Some(url) = parse_http_url(url_str) {
        return Some(url.to_string());
    }

    let joined = match base {
        Some(base) => base.join(url_str).ok()?,
        None if url_str.starts_with("//") => Url::parse(&format!("https:{url_str}")).ok()?,
        None => return None,
    };

    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Extract the hostname from a URL.
#[must_use]
pub fn extract_hostname(url_str: &str) -> Option<String> {
    parse_http_url(url_str).and_then(|url| url.host_str().map(str::to_string))
}

/// Hostname without a leading `www.`, for display as a source name.
#[must_use]
pub fn display_host(url_str: &str) -> Option<String> {
    extract_hostname(url_str).map(|host| host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Normalize a URL for use as a cache key.
///
/// Lowercases scheme and host (the `url` crate does both), drops the
/// fragment, drops tracking query parameters and a trailing path slash.
/// Invalid URLs are returned trimmed and otherwise unchanged.
#[must_use]
pub fn normalize_url(url_str: &str) -> String {
    let Some(mut url) = parse_http_url(url_str) else {
        return url_str.trim().to_string();
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAM.is_match(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}
