//! Result types for pipeline output.
//!
//! This module defines the records that flow between pipeline phases and the
//! `PipelineResult` handed to the rendering layer. Everything here serializes
//! to JSON with camelCase keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which phase produced a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Structural extraction from the fetched page.
    Html,
    /// Built from caller-supplied feed metadata.
    Rss,
    /// Rendered through browser automation.
    Browser,
    /// Retrieved from a content-extraction API.
    Api,
    /// Produced by a generative summarizer.
    AiGenerated,
    /// Synthesized by the fallback generator.
    Fallback,
}

impl ExtractionMethod {
    /// Wire name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Rss => "rss",
            Self::Browser => "browser",
            Self::Api => "api",
            Self::AiGenerated => "ai-generated",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized article representation produced by a single phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    /// Article title.
    pub title: String,
    /// Short description or standfirst.
    pub description: String,
    /// Body as reading HTML.
    pub content: String,
    /// Ranked image URLs.
    pub images: Vec<String>,
    /// Byline.
    pub author: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Publisher or site name.
    pub source: Option<String>,
    /// Whether the phase produced usable content.
    pub success: bool,
    /// Producing phase.
    pub extraction_method: ExtractionMethod,
    /// Phase confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ExtractedContent {
    /// Empty record attributed to `method`.
    #[must_use]
    pub fn empty(method: ExtractionMethod) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            content: String::new(),
            images: Vec::new(),
            author: None,
            published_at: None,
            source: None,
            success: false,
            extraction_method: method,
            confidence: 0.0,
        }
    }
}

/// Structured quality measurements of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct ContentScore {
    /// Characters of plain text in the body.
    pub text_length: usize,
    /// Number of images attached to the candidate.
    pub image_count: usize,
    /// Markup structure indicator in `[0, 1]`.
    pub structure_quality: f64,
    /// Prose readability indicator in `[0, 1]`.
    pub readability_score: f64,
    /// Weighted overall confidence in `[0, 1]`.
    pub overall_confidence: f64,
    /// Title present.
    pub has_title: bool,
    /// Description present.
    pub has_description: bool,
    /// Author present.
    pub has_author: bool,
    /// Publication date present.
    pub has_publish_date: bool,
    /// At least one image.
    pub has_images: bool,
    /// Body contains hyperlinks.
    pub has_links: bool,
    /// `overall_confidence` reached the completeness threshold.
    pub is_complete: bool,
}

/// Coarse quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    /// Nothing renderable beyond a link.
    Minimal,
    /// Enough for a visual card.
    Low,
    /// Enough for an enhanced preview.
    Medium,
    /// Complete article.
    High,
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Rendering mode chosen for incomplete extractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// Render the extracted article in full.
    FullContent,
    /// Truncated description, lead image, outbound link.
    EnhancedPreview,
    /// Hero image card with title overlay.
    VisualCard,
    /// Title, description and a single outbound call to action.
    ExternalLink,
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FullContent => "full-content",
            Self::EnhancedPreview => "enhanced-preview",
            Self::VisualCard => "visual-card",
            Self::ExternalLink => "external-link",
        })
    }
}

/// Assessment derived from a `ContentScore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuality {
    /// Quality bucket.
    pub level: QualityLevel,
    /// Copied from `ContentScore::overall_confidence`.
    pub confidence: f64,
    /// Human-readable diagnostics.
    pub issues: Vec<String>,
    /// Human-readable suggestions.
    pub recommendations: Vec<String>,
    /// Rendering mode for this level.
    pub fallback_strategy: FallbackStrategy,
}

/// Where an image candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Feed media fields.
    Feed,
    /// Page markup or raw-text scan.
    Html,
    /// Open Graph, Twitter card or JSON-LD image.
    Structured,
    /// Category image bank.
    Fallback,
}

/// Image quality bucket. Ordering is low < medium < high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Everything else.
    Low,
    /// Mid-size or thumbnail.
    Medium,
    /// Large or hero image.
    High,
}

/// A validated, ranked image candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// Absolute image URL.
    pub url: String,
    /// Where the candidate came from.
    pub source: ImageSource,
    /// Quality bucket.
    pub quality: ImageQuality,
    /// Width in pixels when known.
    pub width: Option<u32>,
    /// Height in pixels when known.
    pub height: Option<u32>,
    /// Passed scheme and extension/CDN validation.
    pub is_valid: bool,
}

impl ImageInfo {
    /// Pixel area, zero when dimensions are unknown.
    #[must_use]
    pub fn area(&self) -> u64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) => u64::from(w) * u64::from(h),
            _ => 0,
        }
    }
}

/// The object exposed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Final content record.
    #[serde(flatten)]
    pub content: ExtractedContent,
    /// Score of the final candidate.
    pub score: ContentScore,
    /// Assessment of the final candidate.
    pub quality: ContentQuality,
    /// Why a fallback rendering was used.
    pub fallback_reason: Option<String>,
    /// Best ranked image.
    pub hero_image: Option<String>,
    /// Words in the plain-text body.
    pub word_count: usize,
    /// Estimated reading time in minutes.
    pub reading_time: usize,
    /// Detected language (ISO 639-1).
    pub language: Option<String>,
    /// Renderable fallback block, absent when extraction was complete.
    pub rendered: Option<String>,
}
