//! Content quality scoring.
//!
//! [`score_content`] turns a candidate into a [`ContentScore`]. It never
//! fails: missing data simply scores toward zero.

use crate::formatter::{looks_like_html, sanitize_text};
use crate::options::{Options, ScoringWeights};
use crate::patterns::{DIV_TAG, HEADING_TAG, LINK_TAG, LIST_TAG, PARAGRAPH_BREAK, PARAGRAPH_TAG, SENTENCE_END};
use crate::result::{ContentScore, ExtractedContent};

/// Text length at which the structure length bonus is fully earned.
const FULL_LENGTH_BONUS_CHARS: f64 = 2000.0;

/// Score a candidate against `options`' weights and thresholds.
///
/// `text_length` counts characters of the sanitized plain text.
#[must_use]
pub fn score_content(content: &ExtractedContent, options: &Options) -> ContentScore {
    let body = content.content.as_str();
    let text = if looks_like_html(body) {
        sanitize_text(body, usize::MAX)
    } else {
        body.trim().to_string()
    };
    let text_length = text.chars().count();

    let structure_quality = structure_quality(body, text_length);
    let readability_score = readability_score(&text);

    let has_title = !content.title.trim().is_empty();
    let has_description = !content.description.trim().is_empty();
    let has_author = content.author.as_deref().is_some_and(|a| !a.trim().is_empty());
    let has_publish_date = content.published_at.is_some();
    let image_count = content.images.len();
    let has_images = image_count > 0;
    let has_links = LINK_TAG.is_match(body);

    let required = usize::from(has_title) + usize::from(has_description);
    let optional = usize::from(has_author)
        + usize::from(has_publish_date)
        + usize::from(has_images)
        + usize::from(has_links);

    let overall_confidence = overall_confidence(
        &options.weights,
        text_length,
        options.min_text_length,
        structure_quality,
        readability_score,
        required,
        optional,
        image_count,
    );

    ContentScore {
        text_length,
        image_count,
        structure_quality,
        readability_score,
        overall_confidence,
        has_title,
        has_description,
        has_author,
        has_publish_date,
        has_images,
        has_links,
        is_complete: overall_confidence >= options.thresholds.complete_confidence,
    }
}

/// Weighted combination of the component scores, capped to `[0, 1]`.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn overall_confidence(
    weights: &ScoringWeights,
    text_length: usize,
    min_text_length: usize,
    structure: f64,
    readability: f64,
    required_present: usize,
    optional_present: usize,
    image_count: usize,
) -> f64 {
    let length_ratio = if min_text_length == 0 {
        2.0
    } else {
        (text_length as f64 / min_text_length as f64).min(2.0)
    };
    let image_bonus = (image_count as f64 * weights.image_bonus_per_image).min(weights.image_bonus_max);

    let total = weights.text_length * length_ratio / 2.0
        + weights.structure * structure
        + weights.readability * readability
        + weights.required_fields * (required_present.min(2) as f64 / 2.0)
        + weights.optional_fields * (optional_present.min(4) as f64 / 4.0)
        + image_bonus;

    total.clamp(0.0, 1.0)
}

/// Markup structure: paragraphs, headings, lists, divs, text density and length.
#[must_use]
pub fn structure_quality(body: &str, text_length: usize) -> f64 {
    let mut score: f64 = 0.0;
    if PARAGRAPH_TAG.is_match(body) {
        score += 0.3;
    }
    if HEADING_TAG.is_match(body) {
        score += 0.2;
    }
    if LIST_TAG.is_match(body) {
        score += 0.1;
    }
    if DIV_TAG.is_match(body) {
        score += 0.1;
    }

    let markup_length = body.chars().count();
    if markup_length > 0 {
        let density = (text_length as f64 / markup_length as f64).min(1.0);
        score += density * 0.2;
    }
    score += (text_length as f64 / FULL_LENGTH_BONUS_CHARS).min(1.0) * 0.1;

    score.min(1.0)
}

/// Readability from sentence length, word length and paragraphing.
#[must_use]
pub fn readability_score(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let word_count = words.len() as f64;

    let sentences = SENTENCE_END.find_iter(text).count().max(1) as f64;
    let avg_sentence = word_count / sentences;

    let letters: usize = words
        .iter()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).count())
        .sum();
    let avg_word = letters as f64 / word_count;

    let paragraphs = PARAGRAPH_BREAK
        .split(text.trim())
        .filter(|p| !p.trim().is_empty())
        .count();

    let mut score: f64 = 0.0;
    if (10.0..=20.0).contains(&avg_sentence) {
        score += 0.4;
    } else if (5.0..=30.0).contains(&avg_sentence) {
        score += 0.2;
    }
    if (4.0..=6.0).contains(&avg_word) {
        score += 0.3;
    } else if (3.0..=8.0).contains(&avg_word) {
        score += 0.15;
    }
    if paragraphs >= 3 {
        score += 0.2;
    } else if paragraphs >= 2 {
        score += 0.1;
    }
    if words.len() >= 100 {
        score += 0.1;
    }

    score.min(1.0)
}
