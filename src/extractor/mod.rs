//! Content extraction phases.
//!
//! # Module Structure
//!
//! - `html`: structural extraction from a fetched page (structured data,
//!   known containers, heuristic block selection)
//! - `feed`: content records built from caller-supplied feed metadata
//! - `strategy`: the pluggable phase trait and the built-in stub phases

pub mod feed;
pub mod html;
pub mod strategy;

pub use feed::{extract_feed, FeedItem, FeedMedia, FEED_CONFIDENCE};
pub use html::{extract_html, HtmlStrategy};
pub use strategy::{
    default_strategies, AiSummaryStrategy, BrowserStrategy, ContentApiStrategy, ExtractionStrategy,
};
