//! HTML structural extraction.
//!
//! Three strategies run in fixed order and the first success wins:
//!
//! 1. **Structured data**: JSON-LD or microdata `articleBody`.
//! 2. **Known containers**: semantic elements, then CMS class names.
//! 3. **Heuristic**: the block with the most direct text.
//!
//! Fields (title, description, author, date, source) come from the
//! structured record first and the per-field sub-extractors second.

use dom_query::{Document, NodeRef, Selection};
use tracing::debug;
use url::Url;

use crate::dom;
use crate::error::{Error, Result};
use crate::formatter::{self, looks_like_html, sanitize_html, sanitize_text, text_to_html};
use crate::metadata::{extract_json_ld, extract_microdata, PageFields, StructuredArticle};
use crate::options::Options;
use crate::patterns::{BLOCK_CANDIDATE_SELECTOR, CONTAINER_SELECTORS, INLINE_TEXT_TAGS};
use crate::result::{ExtractedContent, ExtractionMethod};
use crate::url_utils::{parse_http_url, resolve_url};

/// Minimum plain-text length for a container match to count as usable.
pub const MIN_CONTAINER_TEXT: usize = 100;

/// Which HTML strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlStrategy {
    Structured,
    Container,
    Heuristic,
}

impl HtmlStrategy {
    /// Fixed confidence reported for candidates from this strategy.
    #[must_use]
    pub fn confidence(self) -> f64 {
        match self {
            Self::Structured => 0.9,
            Self::Container => 0.8,
            Self::Heuristic => 0.6,
        }
    }
}

/// Body found by one of the strategies, before field assembly.
struct Body {
    html: String,
    strategy: HtmlStrategy,
}

/// Extract an article candidate from a fetched page.
///
/// Returns [`Error::NoContent`] when no strategy finds any text.
pub fn extract_html(html: &str, url: &str, options: &Options) -> Result<ExtractedContent> {
    let doc = Document::from(html);

    let fields = PageFields::extract(&doc, url);
    let structured = structured_article(&doc, options.strict_mode);

    let body = structured
        .as_ref()
        .and_then(|article| structured_body(article, options))
        .or_else(|| {
            formatter::strip_boilerplate(&doc);
            container_body(&doc, options).or_else(|| heuristic_body(&doc, options))
        })
        .ok_or(Error::NoContent)?;

    debug!(strategy = ?body.strategy, bytes = body.html.len(), "HTML strategy matched");

    let structured = structured.unwrap_or_default();
    let text = sanitize_text(&body.html, options.max_content_length);
    let base = parse_http_url(url);

    let title = structured
        .headline
        .clone()
        .or(fields.title)
        .or_else(|| formatter::derive_title(&doc, None, &text))
        .unwrap_or_default();
    let description = structured
        .description
        .clone()
        .or(fields.description)
        .or_else(|| formatter::derive_description(&Document::from(body.html.as_str()), &text))
        .unwrap_or_default();

    let mut images: Vec<String> = structured
        .images
        .iter()
        .filter_map(|src| resolve_url(src, base.as_ref()))
        .collect();
    images.extend(inline_images(&body.html, base.as_ref()));
    images.dedup();

    Ok(ExtractedContent {
        title,
        description,
        content: body.html,
        images,
        author: structured.author.or(fields.author),
        published_at: structured.published_at.or(fields.published_at),
        source: structured.publisher.or(fields.source),
        success: true,
        extraction_method: ExtractionMethod::Html,
        confidence: body.strategy.confidence(),
    })
}

/// JSON-LD first; microdata fills whatever JSON-LD left empty.
fn structured_article(doc: &Document, strict: bool) -> Option<StructuredArticle> {
    match (extract_json_ld(doc, strict), extract_microdata(doc)) {
        (Some(mut json_ld), Some(microdata)) => {
            json_ld.merge_missing(microdata);
            Some(json_ld)
        }
        (json_ld, microdata) => json_ld.or(microdata),
    }
}

fn structured_body(article: &StructuredArticle, options: &Options) -> Option<Body> {
    let raw = article.body.as_deref().filter(|_| article.has_body())?;
    let html = if looks_like_html(raw) {
        render_body(raw, options)
    } else {
        text_to_html(&formatter::truncate_chars(raw.trim(), options.max_content_length))
    };
    (!html.is_empty()).then_some(Body {
        html,
        strategy: HtmlStrategy::Structured,
    })
}

fn container_body(doc: &Document, options: &Options) -> Option<Body> {
    CONTAINER_SELECTORS.iter().find_map(|selector| {
        doc.select(selector).nodes().iter().find_map(|node| {
            let inner = dom::inner_html(&Selection::from(*node)).to_string();
            let text_len = sanitize_text(&inner, usize::MAX).chars().count();
            (text_len >= MIN_CONTAINER_TEXT).then(|| Body {
                html: render_body(&inner, options),
                strategy: HtmlStrategy::Container,
            })
        })
    })
}

fn heuristic_body(doc: &Document, options: &Options) -> Option<Body> {
    let best = doc
        .select(BLOCK_CANDIDATE_SELECTOR)
        .nodes()
        .iter()
        .map(|node| (own_text_len(node), *node))
        // Ties keep the earliest (outermost) block.
        .fold(None::<(usize, NodeRef<'_>)>, |best, candidate| match best {
            Some((len, _)) if len >= candidate.0 => best,
            _ => Some(candidate),
        })?;

    if best.0 == 0 {
        return None;
    }

    let inner = dom::inner_html(&Selection::from(best.1)).to_string();
    let html = render_body(&inner, options);
    (!html.is_empty()).then_some(Body {
        html,
        strategy: HtmlStrategy::Heuristic,
    })
}

/// Length of the text a block holds directly: its own text nodes plus the
/// text of inline/paragraph-level children. Nested blocks don't count.
fn own_text_len(node: &NodeRef<'_>) -> usize {
    node.children()
        .iter()
        .map(|child| {
            if child.is_text() {
                child.text().trim().chars().count()
            } else if child
                .node_name()
                .is_some_and(|tag| INLINE_TEXT_TAGS.contains(&tag.to_ascii_lowercase().as_str()))
            {
                child.text().trim().chars().count()
            } else {
                0
            }
        })
        .sum()
}

fn render_body(html: &str, options: &Options) -> String {
    if options.sanitize_content {
        sanitize_html(html, options.max_content_length)
    } else {
        html.trim().to_string()
    }
}

fn inline_images(html: &str, base: Option<&Url>) -> Vec<String> {
    let doc = Document::from(html);
    doc.select("img")
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            dom::first_attribute(&sel, &["src", "data-src"])
                .and_then(|src| resolve_url(&src, base))
        })
        .collect()
}
