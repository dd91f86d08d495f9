//! Metadata extraction: structured data and per-field sub-extractors.
//!
//! - [`json_ld`]: Schema.org JSON-LD `Article` records.
//! - [`microdata`]: `itemprop` annotated articles.
//! - [`fields`]: title, description, author, date and source labels tried in
//!   priority order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub mod fields;
pub mod json_ld;
pub mod microdata;

pub use fields::{FieldSource, PageFields};
pub use json_ld::extract_json_ld;
pub use microdata::extract_microdata;

/// Article fields read from structured data (JSON-LD or microdata).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredArticle {
    /// `headline` (or `name`).
    pub headline: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `articleBody`, usually plain text.
    pub body: Option<String>,
    /// First author name.
    pub author: Option<String>,
    /// `datePublished`.
    pub published_at: Option<DateTime<Utc>>,
    /// `publisher.name`.
    pub publisher: Option<String>,
    /// `image` URLs, unresolved.
    pub images: Vec<String>,
}

impl StructuredArticle {
    /// Whether the record carries an article body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }

    /// Fill missing fields from `other`.
    pub fn merge_missing(&mut self, other: Self) {
        self.headline = self.headline.take().or(other.headline);
        self.description = self.description.take().or(other.description);
        self.body = self.body.take().or(other.body);
        self.author = self.author.take().or(other.author);
        self.published_at = self.published_at.or(other.published_at);
        self.publisher = self.publisher.take().or(other.publisher);
        if self.images.is_empty() {
            self.images = other.images;
        }
    }
}

/// Date-only formats tried after the RFC parsers.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Naive date-time formats without an offset, read as UTC.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a publication date in any of the common feed/meta/JSON-LD shapes.
///
/// Tries RFC 3339, RFC 2822 (feed `pubDate`), naive date-times, then plain
/// dates at midnight UTC.
///
/// # Examples
///
/// ```
/// use rs_newsextract::metadata::parse_date;
///
/// assert!(parse_date("2024-03-05T10:00:00Z").is_some());
/// assert!(parse_date("Tue, 05 Mar 2024 10:00:00 GMT").is_some());
/// assert!(parse_date("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offsets without a colon ("+0000") are common in JSON-LD.
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    // Only the date part of longer strings ("2024-03-05T10:00:00.000+01:00[Europe/Paris]").
    let date_part = s.get(..10).filter(|p| p.chars().all(|c| c.is_ascii_digit() || c == '-'));
    for candidate in [Some(s), date_part].into_iter().flatten() {
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
                return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
            }
        }
    }

    None
}
