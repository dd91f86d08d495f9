//! Content formatting and sanitization.
//!
//! Two variants share the same cleaning pass (script/style removal plus the
//! ordered boilerplate blocklist):
//!
//! - [`sanitize_text`] strips every tag and returns normalized plain text.
//! - [`sanitize_html`] keeps structural tags for the reading view.
//!
//! The derivation helpers compute title, description, word count, reading
//! time and language for a candidate.

use dom_query::{Document, NodeRef, Selection};

use crate::dom;
use crate::patterns::{
    BOILERPLATE_CLASS, BOILERPLATE_SELECTORS, ENTITY_START, IMG_TAG, INLINE_WHITESPACE, LINK_TAG,
    MARKUP_OPEN, MULTIPLE_NEWLINES, PARAGRAPH_BREAK, STRIP_TAGS_SELECTOR, TITLE_SEPARATOR,
};

/// Average adult reading speed used for `reading_time`.
pub const WORDS_PER_MINUTE: usize = 200;

/// Marker appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Elements that start a new text block in the plain-text variant.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "aside", "h1", "h2", "h3",
    "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "figure", "figcaption", "table",
    "tr", "td", "th", "dl", "dt", "dd", "hr", "address", "details", "summary",
];

/// Attributes kept by the reading variant. Everything else (event handlers,
/// inline styles, classes) is dropped.
const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "srcset", "alt", "title", "datetime", "colspan", "rowspan", "width", "height",
];

/// Result of the derivations over a candidate body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Whitespace-separated words in the plain text.
    pub word_count: usize,
    /// `ceil(word_count / 200)` minutes.
    pub reading_time: usize,
    /// ISO 639-1 guess.
    pub language: Option<String>,
    /// Body contains `<img>`.
    pub has_images: bool,
    /// Body contains `<a href>`.
    pub has_links: bool,
}

// =============================================================================
// Cleaning
// =============================================================================

/// Remove non-content elements and the boilerplate blocklist from `doc`.
pub fn strip_boilerplate(doc: &Document) {
    doc.select(STRIP_TAGS_SELECTOR).remove();
    dom::remove_all(doc, BOILERPLATE_SELECTORS);

    // Class/id names that slipped past the selectors (e.g. "ad-slot-top").
    let flagged: Vec<_> = doc
        .select("body *[class], body *[id]")
        .nodes()
        .iter()
        .filter(|node| {
            let sel = Selection::from(**node);
            let names = format!(
                "{} {}",
                dom::get_attribute(&sel, "class").unwrap_or_default(),
                dom::get_attribute(&sel, "id").unwrap_or_default()
            );
            names.split_whitespace().any(|name| BOILERPLATE_CLASS.is_match(name))
        })
        .copied()
        .collect();

    for node in flagged.into_iter().rev() {
        Selection::from(node).remove();
    }
}

/// Plain-text variant: strips all markup, decodes entities, collapses
/// whitespace and truncates to `max_len` characters.
///
/// Block elements become paragraph breaks. Applying this function to its own
/// output returns the output unchanged: decoded text that would parse again as
/// a tag or a character reference keeps its escaped `<` or `&`.
///
/// # Examples
///
/// ```
/// use rs_newsextract::formatter::sanitize_text;
///
/// let text = sanitize_text("<nav>Home</nav><p>Fish &amp; chips</p><p>Second</p>", 1000);
/// assert_eq!(text, "Fish & chips\n\nSecond");
/// assert_eq!(sanitize_text(&text, 1000), text);
/// ```
#[must_use]
pub fn sanitize_text(input: &str, max_len: usize) -> String {
    let doc = Document::from(input);
    strip_boilerplate(&doc);

    let mut raw = String::new();
    if let Some(body) = doc.select("body").nodes().first() {
        collect_block_text(body, &mut raw);
    }

    let text = truncate_chars(&normalize_plain(&raw), max_len);
    match text.strip_suffix(ELLIPSIS) {
        Some(head) => format!("{}{ELLIPSIS}", trim_dangling_reference(head)),
        None => text,
    }
}

/// Drop a trailing `&name` or `&name;` left by a cut, which would otherwise
/// decode on the next pass.
fn trim_dangling_reference(head: &str) -> &str {
    match head.rfind('&') {
        Some(pos) if head[pos + 1..].chars().all(|c| c.is_ascii_alphanumeric() || c == '#' || c == ';') => {
            head[..pos].trim_end()
        }
        _ => head,
    }
}

fn collect_block_text(node: &NodeRef<'_>, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&escape_reparsable(&child.text()));
        } else if child.is_element() {
            let tag = child
                .node_name()
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_default();
            if tag == "br" {
                out.push('\n');
                continue;
            }
            let is_block = BLOCK_TAGS.contains(&tag.as_str());
            if is_block {
                out.push_str("\n\n");
            }
            collect_block_text(&child, out);
            if is_block {
                out.push_str("\n\n");
            }
        }
    }
}

/// Re-escape decoded text that an HTML parser would not read back verbatim.
fn escape_reparsable(text: &str) -> String {
    let amp = ENTITY_START.replace_all(text, "&amp;${1}");
    MARKUP_OPEN.replace_all(&amp, "&lt;${1}").into_owned()
}

/// Collapse horizontal whitespace, trim lines and squeeze blank-line runs.
#[must_use]
pub fn normalize_plain(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = INLINE_WHITESPACE.replace_all(&unified, " ");
    let trimmed_lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    MULTIPLE_NEWLINES
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

/// Reading variant: keeps structural tags, drops boilerplate and unsafe
/// attributes, and truncates at a block boundary once `max_len` characters
/// of text have been kept.
#[must_use]
pub fn sanitize_html(input: &str, max_len: usize) -> String {
    let doc = Document::from(input);
    strip_boilerplate(&doc);
    strip_attributes(&doc);

    let body = doc.select("body");
    let Some(body_node) = body.nodes().first() else {
        return String::new();
    };

    let mut kept = 0usize;
    if truncate_blocks(body_node, &mut kept, max_len) {
        body.append_html(format!("<p>{ELLIPSIS}</p>"));
    }

    dom::inner_html(&body).trim().to_string()
}

/// Keep children of `node` until `max_len` text characters are spent and
/// remove the rest. A child that overflows the budget is entered when it
/// holds blocks of its own, so single wrappers are cut inside. The first
/// leaf block is always kept. Returns whether anything was cut.
fn truncate_blocks(node: &NodeRef<'_>, kept: &mut usize, max_len: usize) -> bool {
    let mut truncated = false;
    for child in node.children() {
        if truncated {
            Selection::from(child).remove();
            continue;
        }
        let len = child.text().chars().count();
        if *kept + len <= max_len {
            *kept += len;
            continue;
        }

        truncated = true;
        if child.children().iter().any(is_block_element) {
            truncate_blocks(&child, kept, max_len);
        } else if *kept == 0 {
            *kept += len;
        } else {
            Selection::from(child).remove();
        }
    }
    truncated
}

fn is_block_element(node: &NodeRef<'_>) -> bool {
    node.is_element()
        && node
            .node_name()
            .is_some_and(|tag| BLOCK_TAGS.contains(&tag.to_ascii_lowercase().as_str()))
}

fn strip_attributes(doc: &Document) {
    for node in doc.select("body *").nodes() {
        let sel = Selection::from(*node);
        for (key, value) in dom::get_all_attributes(&sel) {
            let unsafe_url = matches!(key.as_str(), "href" | "src")
                && value.trim_start().to_ascii_lowercase().starts_with("javascript:");
            if unsafe_url || !ALLOWED_ATTRIBUTES.contains(&key.as_str()) {
                sel.remove_attr(&key);
            }
        }
    }
}

/// Truncate to at most `max_len` characters, ending with [`ELLIPSIS`] when
/// anything was cut. Prefers cutting at a word boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let head: String = text.chars().take(max_len - 1).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if pos > head.len() / 2 => &head[..pos],
        _ => head.as_str(),
    };
    format!("{}{ELLIPSIS}", cut.trim_end())
}

// =============================================================================
// Conversions
// =============================================================================

/// Escape text for interpolation into HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap plain text into `<p>` paragraphs split on blank lines.
#[must_use]
pub fn text_to_html(text: &str) -> String {
    PARAGRAPH_BREAK
        .split(text.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(&p.replace('\n', " "))))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether a string contains markup rather than plain text.
#[must_use]
pub fn looks_like_html(s: &str) -> bool {
    crate::patterns::ANY_TAG.is_match(s)
}

// =============================================================================
// Derivations
// =============================================================================

/// Derive a title: primary heading, then the structured headline, then the
/// document `<title>` (site suffix removed), then the first plausible line
/// of `body_text`.
#[must_use]
pub fn derive_title(doc: &Document, structured: Option<&str>, body_text: &str) -> Option<String> {
    if let Some(h1) = dom::first_with_text(doc, "h1") {
        return Some(h1);
    }
    if let Some(headline) = structured.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(headline.to_string());
    }
    if let Some(title) = dom::first_with_text(doc, "title") {
        return Some(strip_site_suffix(&title));
    }
    first_plausible_line(body_text)
}

/// Drop a trailing " | Site Name" style suffix when the remainder is substantial.
#[must_use]
pub fn strip_site_suffix(title: &str) -> String {
    let parts: Vec<&str> = TITLE_SEPARATOR.split(title).collect();
    match parts.first() {
        Some(first) if parts.len() > 1 && first.trim().chars().count() >= 10 => first.trim().to_string(),
        _ => title.trim().to_string(),
    }
}

/// First line of 10 to 200 characters containing a letter, capped at 150.
#[must_use]
pub fn first_plausible_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            (10..=200).contains(&len) && line.chars().any(char::is_alphabetic)
        })
        .map(|line| truncate_chars(line, 150))
}

/// Derive a description: meta description, Open Graph description, first
/// substantial paragraph, then the truncated body.
#[must_use]
pub fn derive_description(doc: &Document, body_text: &str) -> Option<String> {
    let meta = ["meta[name='description']", "meta[property='og:description']"]
        .iter()
        .find_map(|selector| dom::get_attribute(&doc.select(selector), "content"));
    if meta.is_some() {
        return meta;
    }

    let paragraph = doc.select("p").nodes().iter().find_map(|node| {
        let text = dom::normalized_text(&Selection::from(*node));
        (text.chars().count() >= 40).then_some(text)
    });
    if let Some(p) = paragraph {
        return Some(truncate_chars(&p, 300));
    }

    let body = body_text.trim();
    (!body.is_empty()).then(|| truncate_chars(&body.replace('\n', " "), 200))
}

/// Whitespace-separated word count.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `words` at [`WORDS_PER_MINUTE`], rounded up.
#[must_use]
pub fn reading_time(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Compute word count, reading time, language and markup flags for a body.
#[must_use]
pub fn analyze(content: &str) -> TextStats {
    let text = if looks_like_html(content) {
        sanitize_text(content, usize::MAX)
    } else {
        content.to_string()
    };
    let words = word_count(&text);
    TextStats {
        word_count: words,
        reading_time: reading_time(words),
        language: detect_language(&text),
        has_images: IMG_TAG.is_match(content),
        has_links: LINK_TAG.is_match(content),
    }
}

// =============================================================================
// Language detection
// =============================================================================

const STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "of", "to", "in", "is", "that", "for", "it", "with", "as", "was", "on", "are", "this", "by"]),
    ("es", &["el", "la", "de", "que", "y", "en", "los", "se", "del", "las", "por", "un", "para", "con", "una", "es"]),
    ("fr", &["le", "la", "les", "de", "des", "et", "est", "un", "une", "du", "que", "pour", "dans", "en", "sur", "pas"]),
    ("de", &["der", "die", "und", "das", "ist", "nicht", "mit", "den", "von", "zu", "ein", "eine", "auf", "sich", "des", "dem"]),
    ("pt", &["o", "a", "de", "que", "e", "do", "da", "em", "um", "para", "com", "uma", "os", "no", "na", "não"]),
    ("it", &["il", "di", "che", "e", "la", "per", "un", "una", "sono", "del", "della", "non", "con", "gli", "nel", "anche"]),
];

/// Minimum stop-word hits before a language is reported.
const MIN_LANGUAGE_HITS: usize = 3;

/// Guess the language by stop-word frequency.
///
/// Returns `None` for short or ambiguous text.
#[must_use]
pub fn detect_language(text: &str) -> Option<String> {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    if tokens.is_empty() {
        return None;
    }

    let mut best: Option<(&str, usize)> = None;
    let mut tied = false;
    for (lang, words) in STOP_WORDS {
        let hits = tokens.iter().filter(|t| words.contains(&t.as_str())).count();
        match best {
            Some((_, top)) if hits == top => tied = true,
            Some((_, top)) if hits < top => {}
            _ => {
                best = Some((lang, hits));
                tied = false;
            }
        }
    }

    match best {
        Some((lang, hits)) if hits >= MIN_LANGUAGE_HITS && !tied => Some(lang.to_string()),
        _ => None,
    }
}
