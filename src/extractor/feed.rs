//! Feed-metadata extraction.
//!
//! Builds a content record purely from caller-supplied feed data. Nothing is
//! fetched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::formatter::{self, looks_like_html, sanitize_html, sanitize_text, text_to_html};
use crate::metadata::parse_date;
use crate::options::Options;
use crate::result::{ExtractedContent, ExtractionMethod};
use crate::url_utils::display_host;

/// Confidence reported for feed-derived candidates.
pub const FEED_CONFIDENCE: f64 = 0.7;

/// Longest description taken from feed content when the item has none.
const DERIVED_DESCRIPTION_LEN: usize = 300;

/// A media reference attached to a feed item (`enclosure`, `media:content`,
/// `media:thumbnail`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedMedia {
    pub url: String,
    #[serde(rename = "type", alias = "medium")]
    pub media_type: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
}

impl FeedMedia {
    /// Media entry with just a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set known pixel dimensions.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Whether the declared type allows an image (untyped entries do).
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .is_none_or(|t| t.starts_with("image") || t.is_empty())
    }
}

/// Metadata for one item of an RSS/Atom feed, as supplied by the caller.
///
/// Deserializes from camelCase JSON and accepts the raw RSS element names
/// (`content:encoded`, `dc:creator`, `media:content`) as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "content:encoded")]
    pub content_encoded: Option<String>,
    #[serde(alias = "dc:creator")]
    pub creator: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "pubDate", alias = "published")]
    pub pub_date: Option<String>,
    pub source: Option<String>,
    pub enclosure: Vec<FeedMedia>,
    #[serde(alias = "media:content")]
    pub media_content: Vec<FeedMedia>,
    #[serde(alias = "media:thumbnail")]
    pub media_thumbnail: Vec<FeedMedia>,
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Build a content record from a feed item.
///
/// Returns [`Error::NoContent`] when the item has no title, description or
/// body at all.
pub fn extract_feed(item: &FeedItem, source_url: &str, options: &Options) -> Result<ExtractedContent> {
    let description_raw = non_empty(item.description.as_ref()).or(non_empty(item.summary.as_ref()));
    let body_raw = non_empty(item.content_encoded.as_ref())
        .or(non_empty(item.content.as_ref()))
        .or(description_raw);

    let title = non_empty(item.title.as_ref()).map(|t| sanitize_text(t, 500));
    if title.is_none() && body_raw.is_none() {
        return Err(Error::NoContent);
    }

    let content = body_raw.map(|raw| render(raw, options)).unwrap_or_default();

    let description = match description_raw {
        Some(raw) => sanitize_text(raw, options.max_content_length),
        None => {
            let text = sanitize_text(&content, options.max_content_length);
            formatter::truncate_chars(&text.replace("\n\n", " "), DERIVED_DESCRIPTION_LEN)
        }
    };

    let images = crate::images::collect::feed_candidates(item, source_url)
        .into_iter()
        .map(|candidate| candidate.url)
        .collect();

    Ok(ExtractedContent {
        title: title.unwrap_or_default(),
        description,
        content,
        images,
        author: non_empty(item.creator.as_ref())
            .or(non_empty(item.author.as_ref()))
            .map(str::to_string),
        published_at: non_empty(item.pub_date.as_ref()).and_then(parse_date),
        source: non_empty(item.source.as_ref())
            .map(str::to_string)
            .or_else(|| display_host(source_url)),
        success: true,
        extraction_method: ExtractionMethod::Rss,
        confidence: FEED_CONFIDENCE,
    })
}

fn render(raw: &str, options: &Options) -> String {
    if looks_like_html(raw) {
        if options.sanitize_content {
            sanitize_html(raw, options.max_content_length)
        } else {
            raw.to_string()
        }
    } else {
        text_to_html(&formatter::truncate_chars(raw, options.max_content_length))
    }
}
