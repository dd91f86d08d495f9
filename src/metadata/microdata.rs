//! Microdata (`itemprop`) article extraction.

use dom_query::{Document, Selection};

use super::{parse_date, StructuredArticle};
use crate::dom;

const ARTICLE_SCOPE: &str = "[itemscope][itemtype*='Article'], [itemscope][itemtype*='article']";

/// Read `itemprop` fields from the first article-typed item scope, or from
/// the whole document when no scope is declared.
///
/// Returns `None` unless at least a body or headline is found.
#[must_use]
pub fn extract_microdata(doc: &Document) -> Option<StructuredArticle> {
    let scope = doc.select(ARTICLE_SCOPE);
    let root = if scope.is_empty() { doc.select("html") } else { scope.first() };

    let article = StructuredArticle {
        headline: prop_text(&root, "headline"),
        description: prop_content(&root, "description"),
        body: prop_html(&root, "articleBody"),
        author: author(&root),
        published_at: prop_content(&root, "datePublished").and_then(|s| parse_date(&s)),
        publisher: prop_text(&root, "publisher"),
        images: root
            .select("[itemprop='image']")
            .nodes()
            .iter()
            .filter_map(|node| {
                let sel = Selection::from(*node);
                dom::first_attribute(&sel, &["src", "content", "href"])
            })
            .collect(),
    };

    (article.has_body() || article.headline.is_some()).then_some(article)
}

/// Visible text of the first non-empty `itemprop` element.
fn prop_text(root: &Selection, prop: &str) -> Option<String> {
    root.select(&format!("[itemprop='{prop}']"))
        .nodes()
        .iter()
        .find_map(|node| {
            let sel = Selection::from(*node);
            let text = dom::normalized_text(&sel);
            if text.is_empty() {
                dom::get_attribute(&sel, "content")
            } else {
                Some(text)
            }
        })
}

/// Inner markup of the first `itemprop` element with text.
fn prop_html(root: &Selection, prop: &str) -> Option<String> {
    root.select(&format!("[itemprop='{prop}']"))
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .find(|sel| !dom::normalized_text(sel).is_empty())
        .map(|sel| dom::inner_html(&sel).trim().to_string())
}

/// `content`/`datetime` attribute first, then visible text.
fn prop_content(root: &Selection, prop: &str) -> Option<String> {
    let sel = root.select(&format!("[itemprop='{prop}']"));
    if sel.is_empty() {
        return None;
    }
    dom::first_attribute(&sel, &["content", "datetime"]).or_else(|| prop_text(root, prop))
}

/// Author given as text or as a nested Person scope with `name`.
fn author(root: &Selection) -> Option<String> {
    let sel = root.select("[itemprop='author']");
    if sel.is_empty() {
        return None;
    }
    prop_text(&sel, "name").or_else(|| prop_text(root, "author"))
}
