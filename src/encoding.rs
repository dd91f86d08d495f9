//! Character encoding detection for fetched pages.
//!
//! Response bodies arrive as bytes. The charset is taken from the
//! `Content-Type` header when present, then from a byte-order mark, then from
//! the document's own `<meta>` declarations, and finally defaults to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// `charset=` parameter of a `Content-Type` header value.
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>/]+)"#).expect("valid regex")
});

/// Bytes of the document head examined for `<meta>` declarations.
const META_SNIFF_LEN: usize = 1024;

/// Pick the encoding for a response body.
///
/// `content_type` is the raw `Content-Type` header value, if any.
#[must_use]
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some(encoding) = content_type
        .and_then(|ct| capture(&HEADER_CHARSET_RE, ct))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    if let Some((encoding, _bom_len)) = Encoding::for_bom(body) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(META_SNIFF_LEN)]);
    capture(&CHARSET_META_RE, &head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a response body to UTF-8.
///
/// Undecodable bytes become U+FFFD rather than failing the fetch.
///
/// # Examples
///
/// ```
/// use rs_newsextract::encoding::decode_body;
///
/// let body = b"<html><body>Caf\xE9</body></html>";
/// let text = decode_body(body, Some("text/html; charset=ISO-8859-1"));
/// assert!(text.contains("Café"));
/// ```
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(body, content_type);
    let (decoded, _encoding_used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
