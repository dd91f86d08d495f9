//! # rs-newsextract
//!
//! Adaptive article extraction with graduated fallbacks.
//!
//! Given an article URL and optional feed metadata, the [`Pipeline`] produces
//! the best obtainable normalized article together with a calibrated
//! confidence score. It tries several extraction strategies in order and,
//! when extraction is incomplete, renders one of several fallback blocks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rs_newsextract::{FeedItem, Options, Pipeline};
//!
//! # async fn run() -> rs_newsextract::Result<()> {
//! let pipeline = Pipeline::new(Options::default())?;
//!
//! let feed = FeedItem {
//!     title: Some("Bitcoin tops $70k".into()),
//!     ..FeedItem::default()
//! };
//! let result = pipeline.extract("https://news.example.com/btc", Some(&feed)).await;
//!
//! println!("{} ({})", result.content.title, result.quality.level);
//! # Ok(())
//! # }
//! ```
//!
//! ## Phases
//!
//! - **HTML**: structured data, known containers, then heuristic block selection
//! - **Feed**: a record built from caller-supplied feed metadata
//! - **Strategies**: pluggable browser, content-API and generative phases
//! - **Fallback**: full content, enhanced preview, visual card or external link
//!
//! Results are cached per normalized URL for the configured TTL.

mod error;
mod options;
mod patterns;
mod result;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// URL validation, resolution and cache-key normalization.
pub mod url_utils;

/// Page fetching with timeout and retry.
pub mod fetch;

/// Sanitization and derived text fields.
pub mod formatter;

/// Structured data and per-field metadata extraction.
pub mod metadata;

/// HTML, feed and pluggable extraction phases.
pub mod extractor;

/// Image gathering, validation and ranking.
pub mod images;

/// Content quality scoring.
pub mod validator;

/// Quality levels and fallback strategy selection.
pub mod assessor;

/// Fallback block generation.
pub mod fallback;

/// TTL result cache.
pub mod cache;

/// The orchestrator.
pub mod pipeline;

// Public API - re-exports
pub use cache::{Clock, ManualClock, ResultCache, SystemClock};
pub use error::{Error, Result};
pub use extractor::{ExtractionStrategy, FeedItem, FeedMedia};
pub use fetch::{HttpFetcher, MemoryFetcher, MemoryResponse, PageFetcher};
pub use images::{get_best_image, ImageCandidate, ImagePipeline};
pub use options::{Options, QualityThresholds, ScoringWeights};
pub use pipeline::{Pipeline, PipelineState};
pub use result::{
    ContentQuality, ContentScore, ExtractedContent, ExtractionMethod, FallbackStrategy, ImageInfo, ImageQuality,
    ImageSource, PipelineResult, QualityLevel,
};
