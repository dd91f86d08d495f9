//! Image extraction and ranking.
//!
//! Candidates are gathered by [`collect`], then [`ImagePipeline::process`]
//! validates, deduplicates, size-filters, grades and ranks them. [`bank`]
//! provides the deterministic placeholder used when nothing survives.

use std::collections::HashSet;

use tracing::debug;

use crate::options::Options;
use crate::patterns::{HIGH_QUALITY_KEYWORD, IMAGE_CDN, IMAGE_EXTENSION, MEDIUM_QUALITY_KEYWORD, TRACKING_IMAGE};
use crate::result::{ImageInfo, ImageQuality, ImageSource};
use crate::url_utils::{parse_http_url, resolve_url};

pub mod bank;
pub mod collect;

pub use bank::{fallback_image, fallback_image_info, fnv1a_32, ImageCategory};

/// Pixel area above which an image is graded high.
pub const HIGH_QUALITY_AREA: u64 = 1_000_000;

/// Pixel area above which an image is graded medium.
pub const MEDIUM_QUALITY_AREA: u64 = 200_000;

/// An unprocessed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub source: ImageSource,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageCandidate {
    /// Candidate with unknown dimensions.
    #[must_use]
    pub fn new(url: impl Into<String>, source: ImageSource) -> Self {
        Self {
            url: url.into(),
            source,
            width: None,
            height: None,
        }
    }

    /// Set known pixel dimensions.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Whether `url` is an absolute http(s) URL shaped like an image: an image
/// extension or a known image host, and not a tracking pixel.
#[must_use]
pub fn is_image_url(url: &str) -> bool {
    let Some(parsed) = parse_http_url(url) else {
        return false;
    };
    let path = parsed.path();
    (IMAGE_EXTENSION.is_match(path) || IMAGE_CDN.is_match(url)) && !TRACKING_IMAGE.is_match(path)
}

/// Grade an image from URL keywords and known dimensions.
#[must_use]
pub fn classify_quality(url: &str, width: Option<u32>, height: Option<u32>) -> ImageQuality {
    let area = match (width, height) {
        (Some(w), Some(h)) => u64::from(w) * u64::from(h),
        _ => 0,
    };

    if HIGH_QUALITY_KEYWORD.is_match(url) || area > HIGH_QUALITY_AREA {
        ImageQuality::High
    } else if area > MEDIUM_QUALITY_AREA || MEDIUM_QUALITY_KEYWORD.is_match(url) {
        ImageQuality::Medium
    } else {
        ImageQuality::Low
    }
}

/// First image of a ranked list.
#[must_use]
pub fn get_best_image(images: &[ImageInfo]) -> Option<&ImageInfo> {
    images.first()
}

/// Validation and ranking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePipeline {
    pub max_images: usize,
    pub min_width: u32,
    pub min_height: u32,
    pub prefer_high_quality: bool,
}

impl Default for ImagePipeline {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl ImagePipeline {
    /// Settings taken from pipeline options.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            max_images: options.max_images,
            min_width: options.min_width,
            min_height: options.min_height,
            prefer_high_quality: options.prefer_high_quality,
        }
    }

    /// Resolve, validate, deduplicate, size-filter, grade, rank and truncate.
    ///
    /// Relative URLs resolve against `base_url`. The first occurrence of a
    /// URL wins, so earlier sources keep their dimensions. Ranking is a
    /// stable sort on (quality desc, area desc), skipped when
    /// `prefer_high_quality` is off.
    #[must_use]
    pub fn process(&self, candidates: Vec<ImageCandidate>, base_url: &str) -> Vec<ImageInfo> {
        let base = parse_http_url(base_url);
        let total = candidates.len();
        let mut seen = HashSet::new();

        let mut images: Vec<ImageInfo> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let url = resolve_url(&candidate.url, base.as_ref())?;
                (is_image_url(&url) && seen.insert(url.clone())).then_some(ImageCandidate { url, ..candidate })
            })
            .filter(|c| self.meets_min_size(c))
            .map(|c| ImageInfo {
                quality: classify_quality(&c.url, c.width, c.height),
                url: c.url,
                source: c.source,
                width: c.width,
                height: c.height,
                is_valid: true,
            })
            .collect();

        if self.prefer_high_quality {
            images.sort_by(|a, b| b.quality.cmp(&a.quality).then_with(|| b.area().cmp(&a.area())));
        }
        images.truncate(self.max_images);

        debug!(candidates = total, kept = images.len(), "Ranked images");
        images
    }

    fn meets_min_size(&self, candidate: &ImageCandidate) -> bool {
        candidate.width.is_none_or(|w| w >= self.min_width)
            && candidate.height.is_none_or(|h| h >= self.min_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_min_size() -> ImagePipeline {
        ImagePipeline {
            min_width: 0,
            min_height: 0,
            ..ImagePipeline::default()
        }
    }

    #[test]
    fn test_is_image_url() {
        assert!(is_image_url("https://example.com/a/b.jpg"));
        assert!(is_image_url("https://images.unsplash.com/photo-1?w=800"));
        assert!(!is_image_url("https://example.com/page.html"));
        assert!(!is_image_url("ftp://example.com/a.jpg"));
        assert!(!is_image_url("https://example.com/pixel.gif"));
    }

    #[test]
    fn test_classify_quality() {
        assert_eq!(classify_quality("https://x.test/hero.jpg", None, None), ImageQuality::High);
        assert_eq!(classify_quality("https://x.test/a.jpg", Some(1200), Some(900)), ImageQuality::High);
        assert_eq!(classify_quality("https://x.test/a.jpg", Some(600), Some(400)), ImageQuality::Medium);
        assert_eq!(classify_quality("https://x.test/thumb/a.jpg", None, None), ImageQuality::Medium);
        assert_eq!(classify_quality("https://x.test/a.jpg", Some(300), Some(200)), ImageQuality::Low);
    }

    #[test]
    fn test_best_prefers_quality_then_area() {
        let candidates = vec![
            ImageCandidate::new("https://x.test/small.jpg", ImageSource::Html).with_size(400, 300),
            ImageCandidate::new("https://x.test/mid.jpg", ImageSource::Html).with_size(700, 500),
            ImageCandidate::new("https://x.test/big.jpg", ImageSource::Html).with_size(800, 600),
            ImageCandidate::new("https://x.test/hero.jpg", ImageSource::Html).with_size(320, 240),
        ];
        let ranked = no_min_size().process(candidates, "https://x.test/");
        let urls: Vec<_> = ranked.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://x.test/hero.jpg", "https://x.test/big.jpg", "https://x.test/mid.jpg", "https://x.test/small.jpg"]
        );
        assert_eq!(get_best_image(&ranked).map(|i| i.url.as_str()), Some("https://x.test/hero.jpg"));
    }

    #[test]
    fn test_dedup_resolve_and_min_size() {
        let candidates = vec![
            ImageCandidate::new("/a.jpg", ImageSource::Feed).with_size(1000, 800),
            ImageCandidate::new("https://x.test/a.jpg", ImageSource::Html).with_size(10, 10),
            ImageCandidate::new("https://x.test/tiny.jpg", ImageSource::Html).with_size(80, 80),
            ImageCandidate::new("https://x.test/unknown.jpg", ImageSource::Html),
            ImageCandidate::new("https://x.test/page.html", ImageSource::Html),
        ];
        let ranked = ImagePipeline::default().process(candidates, "https://x.test/post");

        let urls: Vec<_> = ranked.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["https://x.test/a.jpg", "https://x.test/unknown.jpg"]);
        assert_eq!(ranked[0].source, ImageSource::Feed);
        assert!(ranked.iter().all(|i| i.is_valid));
    }

    #[test]
    fn test_truncate_and_keep_order_without_ranking() {
        let candidates: Vec<_> = ["low.jpg", "hero.jpg", "other.jpg"]
            .iter()
            .map(|name| ImageCandidate::new(format!("https://x.test/{name}"), ImageSource::Html))
            .collect();

        let keep_order = ImagePipeline {
            max_images: 2,
            prefer_high_quality: false,
            ..ImagePipeline::default()
        };
        let urls: Vec<_> = keep_order
            .process(candidates, "https://x.test/")
            .into_iter()
            .map(|i| i.url)
            .collect();
        assert_eq!(urls, ["https://x.test/low.jpg", "https://x.test/hero.jpg"]);
    }
}
