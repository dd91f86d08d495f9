//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate so the extractors read in terms of
//! attributes, tags and text rather than raw selection plumbing.

pub use dom_query::{Document, NodeRef, Selection};
pub use tendril::StrTendril;

use crate::patterns::WHITESPACE_NORMALIZE;

// === Attribute Operations ===

/// Get any attribute value, trimmed. Empty values count as missing.
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First non-empty attribute among `names`, in order.
#[must_use]
pub fn first_attribute(sel: &Selection, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| get_attribute(sel, name))
}

/// All attributes of the first node as key-value pairs.
#[must_use]
pub fn get_all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

// === Text Content ===

/// All text content of the selection and its descendants.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Text content with whitespace runs collapsed to single spaces.
#[must_use]
pub fn normalized_text(sel: &Selection) -> String {
    WHITESPACE_NORMALIZE
        .replace_all(&sel.text(), " ")
        .trim()
        .to_string()
}

/// Inner HTML of the selection.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

// === Querying ===

/// First element matching `selector` whose normalized text is non-empty.
#[must_use]
pub fn first_with_text(doc: &Document, selector: &str) -> Option<String> {
    doc.select(selector).nodes().iter().find_map(|node| {
        let text = normalized_text(&Selection::from(*node));
        (!text.is_empty()).then_some(text)
    })
}

/// Remove every element matching any selector in `selectors`.
pub fn remove_all(doc: &Document, selectors: &[&str]) {
    for selector in selectors {
        doc.select(selector).remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_attribute_trims_and_drops_empty() {
        let doc = Document::from(r#"<div id="  a  " class=" "></div>"#);
        let div = doc.select("div");
        assert_eq!(get_attribute(&div, "id"), Some("a".to_string()));
        assert_eq!(get_attribute(&div, "class"), None);
        assert_eq!(get_attribute(&div, "missing"), None);
    }

    #[test]
    fn test_first_attribute_priority() {
        let doc = Document::from(r#"<img data-src="/lazy.jpg" src="/real.jpg">"#);
        let img = doc.select("img");
        assert_eq!(first_attribute(&img, &["src", "data-src"]), Some("/real.jpg".to_string()));
        assert_eq!(first_attribute(&img, &["data-src", "src"]), Some("/lazy.jpg".to_string()));
    }

    #[test]
    fn test_normalized_text_collapses_whitespace() {
        let doc = Document::from("<p>  Hello \n\n   <b>world</b>  </p>");
        assert_eq!(normalized_text(&doc.select("p")), "Hello world");
    }

    #[test]
    fn test_first_with_text_skips_empty() {
        let doc = Document::from("<h1> </h1><h1>Real Title</h1>");
        assert_eq!(first_with_text(&doc, "h1"), Some("Real Title".to_string()));
    }

    #[test]
    fn test_remove_all() {
        let doc = Document::from("<body><nav>menu</nav><p>keep</p><aside>side</aside></body>");
        remove_all(&doc, &["nav", "aside"]);
        assert_eq!(normalized_text(&doc.select("body")), "keep");
    }
}
