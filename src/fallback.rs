//! Fallback content generation.
//!
//! Synthesizes a renderable HTML block for the strategy chosen by the
//! assessor. Generation never fails: every branch produces a block with a
//! working outbound link, and all interpolated text and URLs are escaped.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::formatter::{escape_html, looks_like_html, sanitize_text, truncate_chars};
use crate::images::fallback_image_info;
use crate::options::Options;
use crate::result::{ContentQuality, ContentScore, ExtractionMethod, FallbackStrategy, ImageInfo};
use crate::url_utils::{display_host, parse_http_url};

/// Confidence reported for visual-card renderings.
pub const VISUAL_CARD_CONFIDENCE: f64 = 0.4;

/// Confidence reported for external-link renderings.
pub const EXTERNAL_LINK_CONFIDENCE: f64 = 0.3;

/// Confidence pinned on the minimal card.
pub const MINIMAL_CONFIDENCE: f64 = 0.1;

/// Default length bound of the enhanced-preview summary.
pub const PREVIEW_LENGTH: usize = 300;

/// Everything the generator may interpolate.
#[derive(Debug, Clone, Copy)]
pub struct FallbackInput<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub content: &'a str,
    pub score: &'a ContentScore,
    pub quality: &'a ContentQuality,
    pub author: Option<&'a str>,
    pub source: Option<&'a str>,
    pub published_at: Option<DateTime<Utc>>,
    /// Ranked images, best first.
    pub images: &'a [ImageInfo],
    /// Phase that produced the candidate.
    pub source_method: ExtractionMethod,
    /// Confidence of that phase.
    pub source_confidence: f64,
}

/// A generated block and the provenance to record for it.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackContent {
    pub html: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub confidence: f64,
    pub fallback_reason: String,
    pub extraction_method: ExtractionMethod,
    /// Branch actually rendered.
    pub strategy: RenderedStrategy,
}

/// Rendered branch: one per assessor strategy plus the no-title card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedStrategy {
    FullContent,
    EnhancedPreview,
    VisualCard,
    ExternalLink,
    Minimal,
}

impl From<FallbackStrategy> for RenderedStrategy {
    fn from(strategy: FallbackStrategy) -> Self {
        match strategy {
            FallbackStrategy::FullContent => Self::FullContent,
            FallbackStrategy::EnhancedPreview => Self::EnhancedPreview,
            FallbackStrategy::VisualCard => Self::VisualCard,
            FallbackStrategy::ExternalLink => Self::ExternalLink,
        }
    }
}

/// Strategy-dispatching block generator.
#[derive(Debug, Clone, Copy)]
pub struct FallbackGenerator {
    use_visual_fallbacks: bool,
    preview_length: usize,
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl FallbackGenerator {
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            use_visual_fallbacks: options.use_visual_fallbacks,
            preview_length: PREVIEW_LENGTH,
        }
    }

    /// Override the preview summary length.
    #[must_use]
    pub fn with_preview_length(mut self, length: usize) -> Self {
        self.preview_length = length;
        self
    }

    /// Render the block for `input`.
    ///
    /// A missing title forces the minimal card. Visual cards degrade to an
    /// external link when visual fallbacks are disabled.
    #[must_use]
    pub fn generate(&self, input: &FallbackInput<'_>) -> FallbackContent {
        let strategy = match RenderedStrategy::from(input.quality.fallback_strategy) {
            _ if input.title.trim().is_empty() => RenderedStrategy::Minimal,
            RenderedStrategy::VisualCard if !self.use_visual_fallbacks => RenderedStrategy::ExternalLink,
            other => other,
        };

        debug!(?strategy, url = input.url, "Generating fallback block");

        match strategy {
            RenderedStrategy::FullContent => full_content(input),
            RenderedStrategy::EnhancedPreview => self.enhanced_preview(input),
            RenderedStrategy::VisualCard => visual_card(input),
            RenderedStrategy::ExternalLink => external_link(input),
            RenderedStrategy::Minimal => minimal(input),
        }
    }

    fn enhanced_preview(&self, input: &FallbackInput<'_>) -> FallbackContent {
        let summary_source = if input.description.trim().is_empty() {
            plain(input.content)
        } else {
            input.description.trim().to_string()
        };
        let summary = truncate_chars(&summary_source, self.preview_length);
        let image = input.images.first();

        let mut html = String::from("<div class=\"article-fallback article-fallback--preview\">\n");
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(input.title)));
        html.push_str(&byline(input));
        if let Some(image) = image {
            html.push_str(&format!(
                "<img class=\"article-fallback__image\" src=\"{}\" alt=\"{}\">\n",
                escape_html(&image.url),
                escape_html(input.title)
            ));
        }
        html.push_str(&format!("<p class=\"article-fallback__summary\">{}</p>\n", escape_html(&summary)));
        html.push_str(&format!(
            "<a class=\"article-fallback__link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Read full article</a>\n",
            safe_href(input.url)
        ));
        html.push_str("</div>");

        FallbackContent {
            html,
            title: input.title.to_string(),
            description: summary,
            images: image.map(|i| i.url.clone()).into_iter().collect(),
            confidence: input.source_confidence,
            fallback_reason: reason(input, "enhanced preview"),
            extraction_method: input.source_method,
            strategy: RenderedStrategy::EnhancedPreview,
        }
    }
}

fn full_content(input: &FallbackInput<'_>) -> FallbackContent {
    let body = if looks_like_html(input.content) {
        input.content.to_string()
    } else {
        crate::formatter::text_to_html(input.content)
    };

    let mut html = String::from("<div class=\"article-fallback article-fallback--full\">\n");
    html.push_str("<span class=\"article-fallback__badge\">Full Article</span>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(input.title)));
    html.push_str(&byline(input));
    html.push_str(&format!("<div class=\"article-fallback__body\">\n{body}\n</div>\n"));
    html.push_str(&source_link(input, "View original"));
    html.push_str("</div>");

    FallbackContent {
        html,
        title: input.title.to_string(),
        description: input.description.to_string(),
        images: input.images.iter().map(|i| i.url.clone()).collect(),
        confidence: input.source_confidence,
        fallback_reason: reason(input, "full content"),
        extraction_method: input.source_method,
        strategy: RenderedStrategy::FullContent,
    }
}

fn visual_card(input: &FallbackInput<'_>) -> FallbackContent {
    let hero = input
        .images
        .iter()
        .find(|i| i.is_valid)
        .cloned()
        .unwrap_or_else(|| fallback_image_info(input.title, input.description));
    let description = truncate_chars(input.description.trim(), PREVIEW_LENGTH);

    let mut html = format!(
        "<div class=\"article-fallback article-fallback--card\" style=\"background-image: url('{}')\">\n",
        escape_html(&css_url(&hero.url))
    );
    html.push_str("<div class=\"article-fallback__overlay\">\n");
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(input.title)));
    if !description.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&description)));
    }
    html.push_str(&byline(input));
    html.push_str(&format!(
        "<a class=\"article-fallback__action article-fallback__action--primary\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Read article</a>\n",
        safe_href(input.url)
    ));
    html.push_str(&format!(
        "<button type=\"button\" class=\"article-fallback__action article-fallback__action--secondary\" data-action=\"save\" data-url=\"{}\">Save for later</button>\n",
        escape_html(input.url)
    ));
    html.push_str("</div>\n</div>");

    FallbackContent {
        html,
        title: input.title.to_string(),
        description,
        images: vec![hero.url],
        confidence: VISUAL_CARD_CONFIDENCE,
        fallback_reason: reason(input, "visual card"),
        extraction_method: ExtractionMethod::Fallback,
        strategy: RenderedStrategy::VisualCard,
    }
}

fn external_link(input: &FallbackInput<'_>) -> FallbackContent {
    let description = truncate_chars(input.description.trim(), PREVIEW_LENGTH);

    let mut html = String::from("<div class=\"article-fallback article-fallback--link\">\n");
    html.push_str(&format!("<h3>{}</h3>\n", escape_html(input.title)));
    if !description.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&description)));
    }
    html.push_str(&source_link(input, &format!("Read on {}", source_name(input))));
    html.push_str("</div>");

    FallbackContent {
        html,
        title: input.title.to_string(),
        description,
        images: Vec::new(),
        confidence: EXTERNAL_LINK_CONFIDENCE,
        fallback_reason: reason(input, "external link"),
        extraction_method: ExtractionMethod::Fallback,
        strategy: RenderedStrategy::ExternalLink,
    }
}

fn minimal(input: &FallbackInput<'_>) -> FallbackContent {
    let title = title_for_url(input.url);
    let description = truncate_chars(input.description.trim(), PREVIEW_LENGTH);

    let mut html = String::from("<div class=\"article-fallback article-fallback--minimal\">\n");
    html.push_str(&format!("<h3>{}</h3>\n", escape_html(&title)));
    if !description.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&description)));
    }
    html.push_str(&source_link(input, "Open article"));
    html.push_str("</div>");

    FallbackContent {
        html,
        title,
        description,
        images: Vec::new(),
        confidence: MINIMAL_CONFIDENCE,
        fallback_reason: "no title available; rendered minimal link card".to_string(),
        extraction_method: ExtractionMethod::Fallback,
        strategy: RenderedStrategy::Minimal,
    }
}

/// Placeholder title for an untitled article: "Article from {host}".
#[must_use]
pub fn title_for_url(url: &str) -> String {
    display_host(url).map_or_else(|| "Untitled article".to_string(), |host| format!("Article from {host}"))
}

fn source_name(input: &FallbackInput<'_>) -> String {
    input
        .source
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| display_host(input.url))
        .unwrap_or_else(|| "the original site".to_string())
}

/// Escaped href for the outbound link; non-http(s) URLs become `#`.
fn safe_href(url: &str) -> String {
    parse_http_url(url).map_or_else(|| "#".to_string(), |u| escape_html(u.as_str()))
}

/// Percent-encode the characters that could close a quoted CSS `url()` or
/// start a new declaration.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' | '"' | '(' | ')' | ';' | '\\' | '<' | '>' => {
                out.push_str(&format!("%{:02X}", u32::from(c)));
            }
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn source_link(input: &FallbackInput<'_>, label: &str) -> String {
    format!(
        "<a class=\"article-fallback__link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>\n",
        safe_href(input.url),
        escape_html(label)
    )
}

/// Author/source/date line, or nothing when none is known.
fn byline(input: &FallbackInput<'_>) -> String {
    let mut parts = Vec::new();
    if let Some(author) = input.author.map(str::trim).filter(|a| !a.is_empty()) {
        parts.push(format!("<span class=\"article-fallback__author\">{}</span>", escape_html(author)));
    }
    if let Some(source) = input.source.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(format!("<span class=\"article-fallback__source\">{}</span>", escape_html(source)));
    }
    if let Some(date) = input.published_at {
        parts.push(format!(
            "<time datetime=\"{}\">{}</time>",
            date.to_rfc3339(),
            date.format("%B %-d, %Y")
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("<div class=\"article-fallback__meta\">{}</div>\n", parts.join(" · "))
    }
}

fn reason(input: &FallbackInput<'_>, rendering: &str) -> String {
    format!(
        "{} quality from {} extraction (confidence {:.2}); rendered {rendering}",
        input.quality.level,
        input.source_method,
        input.score.overall_confidence
    )
}

fn plain(content: &str) -> String {
    sanitize_text(content, usize::MAX).replace("\n\n", " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ImageQuality, ImageSource, QualityLevel};

    const URL: &str = "https://www.example.com/news/story";

    fn quality(level: QualityLevel, strategy: FallbackStrategy) -> ContentQuality {
        ContentQuality {
            level,
            confidence: 0.5,
            issues: Vec::new(),
            recommendations: Vec::new(),
            fallback_strategy: strategy,
        }
    }

    fn input<'a>(title: &'a str, score: &'a ContentScore, quality: &'a ContentQuality, images: &'a [ImageInfo]) -> FallbackInput<'a> {
        FallbackInput {
            url: URL,
            title,
            description: "A <b>bold</b> claim & more.",
            content: "<p>Body text.</p>",
            score,
            quality,
            author: Some("Jane Doe"),
            source: Some("Example News"),
            published_at: None,
            images,
            source_method: ExtractionMethod::Rss,
            source_confidence: 0.7,
        }
    }

    fn image(url: &str) -> ImageInfo {
        ImageInfo {
            url: url.to_string(),
            source: ImageSource::Html,
            quality: ImageQuality::High,
            width: Some(1200),
            height: Some(800),
            is_valid: true,
        }
    }

    #[test]
    fn test_full_content_keeps_provenance() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::High, FallbackStrategy::FullContent);
        let out = FallbackGenerator::default().generate(&input("Title", &score, &q, &[]));

        assert_eq!(out.strategy, RenderedStrategy::FullContent);
        assert!(out.html.contains("Full Article"));
        assert!(out.html.contains("<p>Body text.</p>"));
        assert_eq!(out.extraction_method, ExtractionMethod::Rss);
        assert_eq!(out.confidence, 0.7);
    }

    #[test]
    fn test_enhanced_preview() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Medium, FallbackStrategy::EnhancedPreview);
        let images = [image("https://cdn.example.com/a.jpg")];
        let out = FallbackGenerator::default()
            .with_preview_length(10)
            .generate(&input("Title", &score, &q, &images));

        assert_eq!(out.strategy, RenderedStrategy::EnhancedPreview);
        assert!(out.description.chars().count() <= 10);
        assert!(out.html.contains("Read full article"));
        assert!(out.html.contains("https://cdn.example.com/a.jpg"));
        assert_eq!(out.images, vec!["https://cdn.example.com/a.jpg".to_string()]);
        assert_eq!(out.extraction_method, ExtractionMethod::Rss);
    }

    #[test]
    fn test_visual_card_uses_placeholder_without_images() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Low, FallbackStrategy::VisualCard);
        let out = FallbackGenerator::default().generate(&input("Bitcoin slides", &score, &q, &[]));

        assert_eq!(out.strategy, RenderedStrategy::VisualCard);
        assert!(out.images[0].starts_with("/images/fallback/bitcoin-"));
        assert!(out.html.contains("data-action=\"save\""));
        assert!(out.html.contains("Read article"));
        assert_eq!(out.extraction_method, ExtractionMethod::Fallback);
        assert_eq!(out.confidence, VISUAL_CARD_CONFIDENCE);
    }

    #[test]
    fn test_visual_card_hero_cannot_break_out_of_css_url() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Low, FallbackStrategy::VisualCard);
        let images = [image("https://cdn.example.com/a.jpg');background:url('https://evil.test/x")];
        let out = FallbackGenerator::default().generate(&input("Title", &score, &q, &images));

        let style_start = out.html.find("url('").map_or(0, |i| i + 5);
        let style = &out.html[style_start..];
        let style = &style[..style.find("')").unwrap_or(style.len())];
        assert!(style.contains("a.jpg%27%29%3Bbackground:url%28%27https://evil.test/x"), "{style}");
        assert_eq!(out.html.matches("url(").count(), 1);
    }

    #[test]
    fn test_visual_card_disabled_degrades_to_link() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Low, FallbackStrategy::VisualCard);
        let options = Options {
            use_visual_fallbacks: false,
            ..Options::default()
        };
        let out = FallbackGenerator::from_options(&options).generate(&input("Title", &score, &q, &[]));
        assert_eq!(out.strategy, RenderedStrategy::ExternalLink);
    }

    #[test]
    fn test_external_link_names_source_and_escapes() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Minimal, FallbackStrategy::ExternalLink);
        let out = FallbackGenerator::default().generate(&input("<script>x</script>", &score, &q, &[]));

        assert!(out.html.contains("Read on Example News"));
        assert!(out.html.contains("&lt;script&gt;"));
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains("A &lt;b&gt;bold&lt;/b&gt; claim &amp; more."));
        assert!(out.html.contains(&format!("href=\"{URL}\"")));
        assert_eq!(out.confidence, EXTERNAL_LINK_CONFIDENCE);
    }

    #[test]
    fn test_minimal_without_title() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::High, FallbackStrategy::FullContent);
        let out = FallbackGenerator::default().generate(&input("  ", &score, &q, &[]));

        assert_eq!(out.strategy, RenderedStrategy::Minimal);
        assert_eq!(out.title, "Article from example.com");
        assert_eq!(out.confidence, MINIMAL_CONFIDENCE);
        assert!(out.html.contains("href=\"https://www.example.com/news/story\""));
    }

    #[test]
    fn test_unsafe_url_never_linked() {
        let score = ContentScore::default();
        let q = quality(QualityLevel::Minimal, FallbackStrategy::ExternalLink);
        let mut bad = input("Title", &score, &q, &[]);
        bad.url = "javascript:alert(1)";
        let out = FallbackGenerator::default().generate(&bad);
        assert!(out.html.contains("href=\"#\""));
        assert!(!out.html.contains("href=\"javascript"));
    }

    #[test]
    fn test_title_for_url() {
        assert_eq!(title_for_url("https://www.coindesk.com/x"), "Article from coindesk.com");
        assert_eq!(title_for_url("nope"), "Untitled article");
    }
}
