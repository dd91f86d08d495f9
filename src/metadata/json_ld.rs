//! JSON-LD Article Parsing
//!
//! Finds Schema.org `Article` records embedded as
//! `<script type="application/ld+json">`, searching nested objects, arrays and
//! `@graph` containers. Malformed scripts are skipped.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};
use tracing::debug;

use super::{parse_date, StructuredArticle};
use crate::dom;
use crate::error::Result;

/// `@type` values accepted in strict mode.
const STRICT_ARTICLE_TYPES: &[&str] = &["article", "newsarticle"];

/// `@type` values accepted otherwise: `Article` and its common subtypes.
const ARTICLE_TYPES: &[&str] = &[
    "article",
    "newsarticle",
    "blogposting",
    "reportagenewsarticle",
    "analysisnewsarticle",
    "opinionnewsarticle",
    "reviewnewsarticle",
    "backgroundnewsarticle",
    "techarticle",
    "scholarlyarticle",
    "report",
    "liveblogposting",
];

/// Extract the best Article record from the document's JSON-LD.
///
/// Records carrying an `articleBody` win over those that don't; among equals
/// the first in document order wins. With `strict`, only `Article` and
/// `NewsArticle` types match.
#[must_use]
pub fn extract_json_ld(doc: &Document, strict: bool) -> Option<StructuredArticle> {
    let mut scripts: Vec<Value> = Vec::new();

    for script in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let json_text = dom::text_content(&Selection::from(*script)).trim().to_string();
        if json_text.is_empty() {
            continue;
        }

        match parse_script(&json_text) {
            Ok(value) => scripts.push(value),
            Err(err) => debug!(error = %err, "Skipping malformed JSON-LD"),
        }
    }

    let mut records = Vec::new();
    for value in &scripts {
        collect_articles(value, strict, &mut records);
    }

    let best = records
        .iter()
        .position(|r| has_body(r))
        .or_else(|| (!records.is_empty()).then_some(0))?;

    Some(to_article(&records[best]))
}

fn parse_script(text: &str) -> Result<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        // Some CMSes emit raw control characters inside string values.
        Err(_) => Ok(serde_json::from_str(&text.replace(['\n', '\r', '\t'], " "))?),
    }
}

/// Walk objects and arrays, collecting every object typed as an article.
fn collect_articles<'a>(value: &'a Value, strict: bool, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            if is_article_type(&schema_types(map), strict) {
                out.push(map);
            }
            for (key, child) in map {
                // Authors and publishers never contain the article itself.
                if key != "author" && key != "publisher" {
                    collect_articles(child, strict, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_articles(item, strict, out);
            }
        }
        _ => {}
    }
}

/// Lowercased `@type` values of a schema object.
fn schema_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("@type") {
        Some(Value::String(s)) => vec![s.to_lowercase()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_article_type(types: &[String], strict: bool) -> bool {
    let accepted = if strict { STRICT_ARTICLE_TYPES } else { ARTICLE_TYPES };
    types.iter().any(|t| accepted.contains(&t.as_str()))
}

fn has_body(map: &Map<String, Value>) -> bool {
    single_string(map, "articleBody").is_some()
}

fn to_article(map: &Map<String, Value>) -> StructuredArticle {
    StructuredArticle {
        headline: single_string(map, "headline").or_else(|| single_string(map, "name")),
        description: single_string(map, "description"),
        body: single_string(map, "articleBody"),
        author: map.get("author").and_then(person_name),
        published_at: single_string(map, "datePublished").and_then(|s| parse_date(&s)),
        publisher: map.get("publisher").and_then(person_name),
        images: map.get("image").map(image_urls).unwrap_or_default(),
    }
}

/// Trimmed, non-empty string value of `key`, taking the first array element.
fn single_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match map.get(key)? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Name of a person/organization given as a string, an object or an array.
fn person_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) => single_string(map, "name").or_else(|| {
            let given = single_string(map, "givenName").unwrap_or_default();
            let family = single_string(map, "familyName").unwrap_or_default();
            let full = format!("{given} {family}").trim().to_string();
            (!full.is_empty()).then_some(full)
        }),
        Value::Array(items) => items.iter().find_map(person_name),
        _ => None,
    }
}

/// Image URLs given as a string, an `ImageObject` or an array of either.
fn image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Object(map) => single_string(map, "url")
            .or_else(|| single_string(map, "contentUrl"))
            .into_iter()
            .collect(),
        Value::Array(items) => items.iter().flat_map(image_urls).collect(),
        _ => Vec::new(),
    }
}
