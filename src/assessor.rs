//! Quality assessment: maps a [`ContentScore`] to a level and a fallback
//! rendering strategy.
//!
//! | condition                                             | level   | strategy         |
//! |-------------------------------------------------------|---------|------------------|
//! | confidence ≥ 0.8 and text ≥ 500                       | high    | full-content     |
//! | confidence ≥ 0.6 and text ≥ 200                       | medium  | enhanced-preview |
//! | confidence ≥ 0.3 and (text ≥ 100 or any image)        | low     | visual-card      |
//! | otherwise                                             | minimal | external-link    |
//!
//! Rows are checked top-down; the first match wins. Thresholds come from
//! [`QualityThresholds`].

use crate::options::QualityThresholds;
use crate::result::{ContentQuality, ContentScore, FallbackStrategy, QualityLevel};

/// Level for a score. Pure in `score` and `thresholds`.
#[must_use]
pub fn quality_level(score: &ContentScore, thresholds: &QualityThresholds) -> QualityLevel {
    let confidence = score.overall_confidence;
    let length = score.text_length;

    if confidence >= thresholds.high_confidence && length >= thresholds.high_text_length {
        QualityLevel::High
    } else if confidence >= thresholds.medium_confidence && length >= thresholds.medium_text_length {
        QualityLevel::Medium
    } else if confidence >= thresholds.low_confidence
        && (length >= thresholds.low_text_length || score.image_count > 0)
    {
        QualityLevel::Low
    } else {
        QualityLevel::Minimal
    }
}

/// Rendering strategy for a level.
#[must_use]
pub fn strategy_for(level: QualityLevel) -> FallbackStrategy {
    match level {
        QualityLevel::High => FallbackStrategy::FullContent,
        QualityLevel::Medium => FallbackStrategy::EnhancedPreview,
        QualityLevel::Low => FallbackStrategy::VisualCard,
        QualityLevel::Minimal => FallbackStrategy::ExternalLink,
    }
}

/// Full assessment with informational issues and recommendations.
#[must_use]
pub fn assess(score: &ContentScore, thresholds: &QualityThresholds) -> ContentQuality {
    let level = quality_level(score, thresholds);
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if !score.has_title {
        issues.push("Missing title".to_string());
        recommendations.push("Derive a title from the page heading or URL".to_string());
    }
    if score.text_length < thresholds.medium_text_length {
        issues.push(format!("Content too short ({} characters)", score.text_length));
        recommendations.push("Link to the original article for the full text".to_string());
    }
    if !score.has_images {
        issues.push("No images found".to_string());
        recommendations.push("Use a category placeholder image".to_string());
    }
    if !score.has_description {
        issues.push("Missing description".to_string());
        recommendations.push("Summarize the opening paragraph as a description".to_string());
    }

    ContentQuality {
        level,
        confidence: score.overall_confidence,
        issues,
        recommendations,
        fallback_strategy: strategy_for(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(confidence: f64, text_length: usize, image_count: usize) -> ContentScore {
        ContentScore {
            overall_confidence: confidence,
            text_length,
            image_count,
            has_images: image_count > 0,
            has_title: true,
            has_description: true,
            ..ContentScore::default()
        }
    }

    fn level(confidence: f64, text_length: usize, image_count: usize) -> QualityLevel {
        quality_level(&score(confidence, text_length, image_count), &QualityThresholds::default())
    }

    #[test]
    fn test_table_rows() {
        assert_eq!(level(0.9, 800, 0), QualityLevel::High);
        assert_eq!(level(0.9, 300, 0), QualityLevel::Medium);
        assert_eq!(level(0.65, 250, 0), QualityLevel::Medium);
        assert_eq!(level(0.65, 150, 0), QualityLevel::Low);
        assert_eq!(level(0.35, 40, 1), QualityLevel::Low);
        assert_eq!(level(0.35, 40, 0), QualityLevel::Minimal);
        assert_eq!(level(0.1, 5000, 3), QualityLevel::Minimal);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(level(0.79, 1000, 0), QualityLevel::Medium);
        assert_eq!(level(0.80, 1000, 0), QualityLevel::High);
        assert_eq!(level(0.59, 1000, 0), QualityLevel::Low);
        assert_eq!(level(0.60, 1000, 0), QualityLevel::Medium);
        assert_eq!(level(0.29, 1000, 0), QualityLevel::Minimal);
        assert_eq!(level(0.30, 1000, 0), QualityLevel::Low);
        assert_eq!(level(0.9, 499, 0), QualityLevel::Medium);
        assert_eq!(level(0.9, 500, 0), QualityLevel::High);
    }

    #[test]
    fn test_strategy_mapping() {
        let quality = assess(&score(0.9, 800, 2), &QualityThresholds::default());
        assert_eq!(quality.fallback_strategy, FallbackStrategy::FullContent);
        assert!(quality.issues.is_empty());

        let quality = assess(&score(0.1, 10, 0), &QualityThresholds::default());
        assert_eq!(quality.level, QualityLevel::Minimal);
        assert_eq!(quality.fallback_strategy, FallbackStrategy::ExternalLink);
        assert_eq!(quality.confidence, 0.1);
    }

    #[test]
    fn test_issues_and_recommendations() {
        let bare = ContentScore::default();
        let quality = assess(&bare, &QualityThresholds::default());
        assert_eq!(quality.issues.len(), 4);
        assert_eq!(quality.recommendations.len(), 4);
        assert!(quality.issues.iter().any(|i| i == "Missing title"));
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = QualityThresholds {
            high_confidence: 0.95,
            ..QualityThresholds::default()
        };
        assert_eq!(quality_level(&score(0.9, 800, 0), &strict), QualityLevel::Medium);
    }
}
