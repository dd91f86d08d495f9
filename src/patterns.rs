//! Compiled regex patterns and CSS selectors for extraction.
//!
//! All patterns are compiled once on first use via `LazyLock`.
//! Patterns are organized by the component that consumes them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Boilerplate Blocklist
// =============================================================================

/// Elements removed outright before any text is measured.
pub const STRIP_TAGS_SELECTOR: &str =
    "script, style, noscript, iframe, template, svg, object, embed, form, button, input, select";

/// Ordered boilerplate blocklist. Earlier entries are removed first; the
/// order only matters for nested matches, which are removed with their parent.
pub const BOILERPLATE_SELECTORS: &[&str] = &[
    // Navigation
    "nav",
    "[role='navigation']",
    "[class*='breadcrumb']",
    "[class*='menu']",
    // Page chrome
    "body > header",
    "body > footer",
    "[class*='site-header']",
    "[class*='site-footer']",
    "[role='banner']",
    "[role='contentinfo']",
    // Ads
    "[class*='advert']",
    "[id*='advert']",
    "[class*='sponsor']",
    "[class~='ad']",
    "[class~='ads']",
    "ins",
    // Social widgets
    "[class*='share']",
    "[class*='social']",
    // Comments
    "[class*='comment']",
    "[id*='comment']",
    "#disqus_thread",
    // Sidebars
    "aside",
    "[class*='sidebar']",
    "[class*='related']",
    "[class*='recommended']",
    // Newsletters
    "[class*='newsletter']",
    "[class*='subscribe']",
    // Legal and cookie notices
    "[class*='cookie']",
    "[id*='cookie']",
    "[class*='consent']",
    "[class*='gdpr']",
    "[class*='disclaimer']",
    "[class*='copyright']",
];

/// Matches class/id names of boilerplate that survived selector removal.
pub static BOILERPLATE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^nav$|^nav[-_]|[-_]nav$|navbar|navigation|breadcrumb|\bmenu\b|site[-_]?(?:header|footer)|\bfooter\b|\bads?\b|advert|sponsor|promo|shar(?:e|ing)|social|comment|sidebar|related|recommend|newsletter|subscribe|cookie|consent|gdpr|legal|disclaimer|copyright|taboola|outbrain)",
    )
    .expect("BOILERPLATE_CLASS regex")
});

// =============================================================================
// Content Identification
// =============================================================================

/// Ordered container patterns: semantic elements first, then CMS class names.
pub const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    "[role='article']",
    "main",
    "[role='main']",
    "[itemprop='articleBody']",
    ".article-body",
    ".article-content",
    ".article__body",
    ".article__content",
    ".story-body",
    ".story-content",
    ".post-content",
    ".post-body",
    ".entry-content",
    ".content-body",
    ".news-content",
    "#article-body",
    "#story-body",
    "[class*='article-body']",
    "[class*='article-content']",
    "[class*='post-content']",
    "#content",
    ".content",
];

/// Block-level elements considered by the heuristic segmenter.
pub const BLOCK_CANDIDATE_SELECTOR: &str = "div, section, article, main, td, body";

/// Elements whose text counts toward the enclosing block in the heuristic segmenter.
pub const INLINE_TEXT_TAGS: &[&str] = &[
    "p", "span", "a", "em", "strong", "b", "i", "u", "small", "mark", "br", "blockquote",
    "q", "code", "pre", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "figure", "figcaption",
];

// =============================================================================
// Text Cleaning
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

/// Matches horizontal whitespace runs (keeps newlines).
pub static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("INLINE_WHITESPACE regex"));

/// Matches three or more consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("MULTIPLE_NEWLINES regex"));

/// Matches blank-line paragraph separators.
pub static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("PARAGRAPH_BREAK regex"));

/// Matches sentence terminators.
pub static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s|$)").expect("SENTENCE_END regex"));

/// Matches any markup tag.
pub static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("ANY_TAG regex"));

/// Matches a `<` that an HTML parser would open a tag or comment with.
pub static MARKUP_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z/!?])").expect("MARKUP_OPEN regex"));

/// Matches an `&` that an HTML parser would decode as a character reference,
/// including the legacy names accepted without a trailing semicolon.
pub static ENTITY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]|#[xX][0-9A-Fa-f]|[A-Za-z][A-Za-z0-9]*;|amp|lt|gt|quot|nbsp|copy|reg|AMP|LT|GT|QUOT|COPY|REG)")
        .expect("ENTITY_START regex")
});

// =============================================================================
// Structure Indicators
// =============================================================================

/// Paragraph opening tag.
pub static PARAGRAPH_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p[\s>]").expect("PARAGRAPH_TAG regex"));

/// Heading opening tag.
pub static HEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-6][\s>]").expect("HEADING_TAG regex"));

/// List opening tag.
pub static LIST_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:ul|ol)[\s>]").expect("LIST_TAG regex"));

/// Div opening tag.
pub static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div[\s>]").expect("DIV_TAG regex"));

/// Anchor with an href.
pub static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a\s[^>]*href\s*="#).expect("LINK_TAG regex"));

/// Image tag.
pub static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img[\s>/]").expect("IMG_TAG regex"));

// =============================================================================
// Image Patterns
// =============================================================================

/// URL path ends with a raster/vector image extension.
pub static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|gif|webp|avif|bmp|svg)(?:$|[?#])").expect("IMAGE_EXTENSION regex")
});

/// Known image CDNs and hosts whose URLs often carry no extension.
pub static IMAGE_CDN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:[^/]*\.)?(?:images\.unsplash\.com|res\.cloudinary\.com|[^/]*\.imgix\.net|[^/]*\.cloudfront\.net|i\.imgur\.com|pbs\.twimg\.com|[^/]*\.googleusercontent\.com|cdn\.[^/]+|img\.[^/]+|images\.[^/]+|media\.[^/]+|static\.[^/]+)/",
    )
    .expect("IMAGE_CDN regex")
});

/// Raw-text scan for image URLs embedded anywhere in a document.
pub static RAW_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)https?://[^\s"'<>()\\]+?\.(?:jpe?g|png|gif|webp|avif)(?:\?[^\s"'<>()\\]*)?|https?://(?:images\.unsplash\.com|res\.cloudinary\.com|[a-z0-9-]+\.imgix\.net)/[^\s"'<>()\\]+"#,
    )
    .expect("RAW_IMAGE_URL regex")
});

/// CSS `background-image: url(...)`.
pub static CSS_BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*url\(\s*['"]?([^'")]+)['"]?\s*\)"#)
        .expect("CSS_BACKGROUND_IMAGE regex")
});

/// URL keywords that mark a high-quality image.
pub static HIGH_QUALITY_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:large|\bhd\b|[-_]hd[-_./]|hero)").expect("HIGH_QUALITY_KEYWORD regex")
});

/// URL keywords that mark a medium-quality image.
pub static MEDIUM_QUALITY_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:medium|thumb)").expect("MEDIUM_QUALITY_KEYWORD regex"));

/// Tracking/spacer images that are never article images.
pub static TRACKING_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:pixel|spacer|blank|1x1|tracking|beacon|favicon|sprite)\.")
        .expect("TRACKING_IMAGE regex")
});

// =============================================================================
// Metadata Patterns
// =============================================================================

/// Strips a leading "By" from bylines.
pub static BYLINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:by|written by|posted by|author:)\s+").expect("BYLINE_PREFIX regex"));

/// Common separators between an article title and the site name.
pub static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[\|–—]\s+|\s+-\s+").expect("TITLE_SEPARATOR regex"));

/// Query parameters dropped from cache keys.
pub static TRACKING_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:utm_[a-z]+|fbclid|gclid|mc_cid|mc_eid)$").expect("TRACKING_PARAM regex"));
