//! Configuration options for the extraction pipeline.
//!
//! The `Options` struct controls fetching, image ranking, caching and the
//! scoring constants, allowing callers to tune the pipeline without touching
//! orchestration logic. Every field has a default; JSON configuration uses
//! camelCase keys and may omit any field.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration options for the extraction pipeline.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_newsextract::Options;
///
/// let options = Options {
///     max_images: 3,
///     enable_caching: false,
///     ..Options::default()
/// };
/// assert_eq!(options.timeout().as_millis(), 15_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Per-attempt fetch timeout in milliseconds.
    ///
    /// Default: `15000`
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,

    /// Total fetch attempts before giving up.
    ///
    /// Default: `3`
    pub max_retries: u32,

    /// Gather and rank images.
    ///
    /// Default: `true`
    pub include_images: bool,

    /// Strip boilerplate and unsafe markup from extracted bodies.
    ///
    /// Default: `true`
    pub sanitize_content: bool,

    /// Run the feed extractor when HTML extraction is not good enough.
    ///
    /// Default: `true`
    #[serde(rename = "fallbackToRSS")]
    pub fallback_to_rss: bool,

    /// Enable the browser-automation phase.
    ///
    /// Default: `false`
    pub use_browser_automation: bool,

    /// Enable the generative summarization phase.
    ///
    /// Default: `false`
    #[serde(rename = "useAIGeneration")]
    pub use_ai_generation: bool,

    /// Use the category image bank when no real image is found.
    ///
    /// Default: `true`
    pub use_visual_fallbacks: bool,

    /// Read and write the result cache.
    ///
    /// Default: `true`
    pub enable_caching: bool,

    /// Result cache time-to-live in milliseconds.
    ///
    /// Default: `3600000` (1 hour)
    #[serde(rename = "cacheTimeout")]
    pub cache_timeout_ms: u64,

    /// Maximum number of images kept after ranking.
    ///
    /// Default: `5`
    pub max_images: usize,

    /// Images with a known width below this are dropped.
    ///
    /// Default: `300`
    pub min_width: u32,

    /// Images with a known height below this are dropped.
    ///
    /// Default: `200`
    pub min_height: u32,

    /// Rank images by quality and area. When false, gathering order is kept.
    ///
    /// Default: `true`
    pub prefer_high_quality: bool,

    /// Stricter structured-data matching and no feed fallback once HTML
    /// extraction produced content.
    ///
    /// Default: `false`
    pub strict_mode: bool,

    /// Text length at which the length component of the confidence saturates
    /// halfway (it saturates fully at twice this value).
    ///
    /// Default: `200`
    pub min_text_length: usize,

    /// Sanitized text is truncated to this many characters.
    ///
    /// Default: `50000`
    pub max_content_length: usize,

    /// Base delay for exponential retry backoff in milliseconds.
    ///
    /// Attempt `n` waits `base * 2^n` before the next try.
    ///
    /// Default: `1000`
    #[serde(rename = "backoffBase")]
    pub backoff_base_ms: u64,

    /// Component weights for the overall confidence.
    pub weights: ScoringWeights,

    /// Quality level thresholds.
    pub thresholds: QualityThresholds,
}

impl Options {
    /// Per-attempt fetch timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Result cache time-to-live.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Base delay for retry backoff.
    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_retries: 3,
            include_images: true,
            sanitize_content: true,
            fallback_to_rss: true,
            use_browser_automation: false,
            use_ai_generation: false,
            use_visual_fallbacks: true,
            enable_caching: true,
            cache_timeout_ms: 3_600_000,
            max_images: 5,
            min_width: 300,
            min_height: 200,
            prefer_high_quality: true,
            strict_mode: false,
            min_text_length: 200,
            max_content_length: 50_000,
            backoff_base_ms: 1_000,
            weights: ScoringWeights::default(),
            thresholds: QualityThresholds::default(),
        }
    }
}

/// Weights of the overall confidence components.
///
/// These were tuned empirically; treat them as knobs, not invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringWeights {
    /// Weight of the normalized text length.
    pub text_length: f64,
    /// Weight of `structure_quality`.
    pub structure: f64,
    /// Weight of `readability_score`.
    pub readability: f64,
    /// Weight of the required fields (title, description).
    pub required_fields: f64,
    /// Weight of the optional fields (author, date, images, links).
    pub optional_fields: f64,
    /// Bonus per image.
    pub image_bonus_per_image: f64,
    /// Cap on the total image bonus.
    pub image_bonus_max: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            text_length: 0.4,
            structure: 0.25,
            readability: 0.15,
            required_fields: 0.2,
            optional_fields: 0.1,
            image_bonus_per_image: 0.01,
            image_bonus_max: 0.05,
        }
    }
}

/// Threshold table used by the quality assessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityThresholds {
    /// Minimum confidence for `high`.
    pub high_confidence: f64,
    /// Minimum text length for `high`.
    pub high_text_length: usize,
    /// Minimum confidence for `medium`.
    pub medium_confidence: f64,
    /// Minimum text length for `medium`.
    pub medium_text_length: usize,
    /// Minimum confidence for `low`.
    pub low_confidence: f64,
    /// Minimum text length for `low` when there are no images.
    pub low_text_length: usize,
    /// `overall_confidence` at or above which a score is complete.
    pub complete_confidence: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            high_text_length: 500,
            medium_confidence: 0.6,
            medium_text_length: 200,
            low_confidence: 0.3,
            low_text_length: 100,
            complete_confidence: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.timeout_ms, 15_000);
        assert_eq!(opts.max_retries, 3);
        assert!(opts.include_images);
        assert!(opts.sanitize_content);
        assert!(opts.fallback_to_rss);
        assert!(!opts.use_browser_automation);
        assert!(!opts.use_ai_generation);
        assert!(opts.use_visual_fallbacks);
        assert!(opts.enable_caching);
        assert_eq!(opts.cache_timeout_ms, 3_600_000);
        assert_eq!(opts.max_images, 5);
        assert_eq!(opts.min_width, 300);
        assert_eq!(opts.min_height, 200);
        assert!(opts.prefer_high_quality);
        assert!(!opts.strict_mode);
        assert_eq!(opts.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_default_weights_sum() {
        let w = ScoringWeights::default();
        let sum = w.text_length + w.structure + w.readability + w.required_fields + w.optional_fields;
        assert!((sum - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let json = r#"{"timeout": 5000, "maxImages": 2, "fallbackToRSS": false,
                       "thresholds": {"highConfidence": 0.9}}"#;
        let opts: Options = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(opts.timeout(), Duration::from_secs(5));
        assert_eq!(opts.max_images, 2);
        assert!(!opts.fallback_to_rss);
        assert!((opts.thresholds.high_confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(opts.thresholds.high_text_length, 500);
        assert_eq!(opts.min_width, 300);
    }

    #[test]
    fn test_custom_thresholds() {
        let opts = Options {
            thresholds: QualityThresholds {
                medium_confidence: 0.5,
                ..QualityThresholds::default()
            },
            ..Options::default()
        };

        assert!((opts.thresholds.medium_confidence - 0.5).abs() < f64::EPSILON);
        assert!((opts.thresholds.low_confidence - 0.3).abs() < f64::EPSILON);
    }
}
