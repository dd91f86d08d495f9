//! Per-field sub-extractors.
//!
//! Each field is a priority-ordered list of `(selector, source)` patterns.
//! The first pattern that yields a non-empty value wins.

use chrono::{DateTime, Utc};
use dom_query::{Document, Selection};

use super::parse_date;
use crate::dom;
use crate::formatter::strip_site_suffix;
use crate::patterns::{BYLINE_PREFIX, WHITESPACE_NORMALIZE};
use crate::url_utils::display_host;

/// Where a pattern reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// A named attribute.
    Attr(&'static str),
    /// Normalized element text.
    Text,
    /// The attribute if present, else the text.
    AttrOrText(&'static str),
}

/// One label/attribute pattern for a field.
#[derive(Debug, Clone, Copy)]
pub struct FieldPattern {
    pub selector: &'static str,
    pub source: FieldSource,
}

const fn attr(selector: &'static str, name: &'static str) -> FieldPattern {
    FieldPattern {
        selector,
        source: FieldSource::Attr(name),
    }
}

const fn text(selector: &'static str) -> FieldPattern {
    FieldPattern {
        selector,
        source: FieldSource::Text,
    }
}

const TITLE_PATTERNS: &[FieldPattern] = &[
    attr("meta[property='og:title']", "content"),
    attr("meta[name='twitter:title']", "content"),
    text("h1"),
    text("title"),
];

const DESCRIPTION_PATTERNS: &[FieldPattern] = &[
    attr("meta[name='description']", "content"),
    attr("meta[property='og:description']", "content"),
    attr("meta[name='twitter:description']", "content"),
];

const AUTHOR_PATTERNS: &[FieldPattern] = &[
    attr("meta[name='author']", "content"),
    attr("meta[property='article:author']", "content"),
    attr("meta[name='parsely-author']", "content"),
    attr("meta[name='sailthru.author']", "content"),
    text("[rel='author']"),
    text("[itemprop='author'] [itemprop='name']"),
    text("[itemprop='author']"),
    text(".byline__name"),
    text(".author-name"),
    text(".byline"),
    text(".author"),
];

const DATE_PATTERNS: &[FieldPattern] = &[
    attr("meta[property='article:published_time']", "content"),
    attr("meta[name='pubdate']", "content"),
    attr("meta[name='publishdate']", "content"),
    attr("meta[name='date']", "content"),
    attr("meta[itemprop='datePublished']", "content"),
    attr("meta[name='parsely-pub-date']", "content"),
    FieldPattern {
        selector: "time[itemprop='datePublished']",
        source: FieldSource::AttrOrText("datetime"),
    },
    attr("time[datetime]", "datetime"),
];

const SOURCE_PATTERNS: &[FieldPattern] = &[
    attr("meta[property='og:site_name']", "content"),
    attr("meta[name='application-name']", "content"),
    attr("meta[name='publisher']", "content"),
    attr("meta[name='twitter:site']", "content"),
];

/// Longest author string treated as a name rather than a paragraph.
const MAX_AUTHOR_LEN: usize = 100;

impl FieldPattern {
    fn read(&self, sel: &Selection) -> Option<String> {
        let value = match self.source {
            FieldSource::Attr(name) => dom::get_attribute(sel, name),
            FieldSource::Text => Some(dom::normalized_text(sel)),
            FieldSource::AttrOrText(name) => {
                dom::get_attribute(sel, name).or_else(|| Some(dom::normalized_text(sel)))
            }
        }?;
        let value = WHITESPACE_NORMALIZE.replace_all(&value, " ").trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

/// First non-empty value across `patterns`, trying every match of each
/// selector before moving to the next pattern.
#[must_use]
pub fn first_match(doc: &Document, patterns: &[FieldPattern]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        doc.select(pattern.selector)
            .nodes()
            .iter()
            .find_map(|node| pattern.read(&Selection::from(*node)))
    })
}

/// Page title from social meta tags, the primary heading or `<title>`.
#[must_use]
pub fn extract_title(doc: &Document) -> Option<String> {
    first_match(doc, TITLE_PATTERNS).map(|t| strip_site_suffix(&t))
}

/// Page description from the description meta tags.
#[must_use]
pub fn extract_description(doc: &Document) -> Option<String> {
    first_match(doc, DESCRIPTION_PATTERNS)
}

/// Author name with any "By" prefix removed.
#[must_use]
pub fn extract_author(doc: &Document) -> Option<String> {
    AUTHOR_PATTERNS.iter().find_map(|pattern| {
        doc.select(pattern.selector).nodes().iter().find_map(|node| {
            let raw = pattern.read(&Selection::from(*node))?;
            let name = BYLINE_PREFIX.replace(&raw, "").trim().to_string();
            // URLs (article:author profile links) are not names.
            let plausible = !name.is_empty()
                && name.chars().count() <= MAX_AUTHOR_LEN
                && !name.starts_with("http");
            plausible.then_some(name)
        })
    })
}

/// First parsable publication date.
#[must_use]
pub fn extract_published(doc: &Document) -> Option<DateTime<Utc>> {
    DATE_PATTERNS.iter().find_map(|pattern| {
        doc.select(pattern.selector)
            .nodes()
            .iter()
            .find_map(|node| pattern.read(&Selection::from(*node)).and_then(|s| parse_date(&s)))
    })
}

/// Publisher/site name, falling back to the URL host.
#[must_use]
pub fn extract_source(doc: &Document, url: &str) -> Option<String> {
    first_match(doc, SOURCE_PATTERNS)
        .map(|s| s.trim_start_matches('@').to_string())
        .or_else(|| display_host(url))
}

/// All per-field values for a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl PageFields {
    /// Run every field extractor over `doc`.
    #[must_use]
    pub fn extract(doc: &Document, url: &str) -> Self {
        Self {
            title: extract_title(doc),
            description: extract_description(doc),
            author: extract_author(doc),
            published_at: extract_published(doc),
            source: extract_source(doc, url),
        }
    }
}
