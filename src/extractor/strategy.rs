//! Pluggable extraction phases.
//!
//! The pipeline runs an ordered list of [`ExtractionStrategy`] trait objects
//! after the HTML and feed phases. The built-in browser, content-API and
//! generative strategies are extension points that yield no result.

use async_trait::async_trait;
use tracing::debug;

use super::feed::FeedItem;
use crate::error::Result;
use crate::options::Options;
use crate::result::{ExtractedContent, ExtractionMethod};

/// An extraction phase that may produce a content candidate.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs and fallback reasons.
    fn name(&self) -> &'static str;

    /// Method recorded on candidates this strategy produces.
    fn method(&self) -> ExtractionMethod;

    /// Whether the phase runs under `options`.
    fn enabled(&self, _options: &Options) -> bool {
        true
    }

    /// Try to produce a candidate. `Ok(None)` means "nothing to offer".
    async fn extract(
        &self,
        url: &str,
        feed: Option<&FeedItem>,
        options: &Options,
    ) -> Result<Option<ExtractedContent>>;
}

/// Headless-browser rendering phase. Runs when `use_browser_automation` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStrategy;

#[async_trait]
impl ExtractionStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Browser
    }

    fn enabled(&self, options: &Options) -> bool {
        options.use_browser_automation
    }

    async fn extract(&self, url: &str, _feed: Option<&FeedItem>, _options: &Options) -> Result<Option<ExtractedContent>> {
        debug!(%url, "No browser backend configured");
        Ok(None)
    }
}

/// Third-party content API phase. Always runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentApiStrategy;

#[async_trait]
impl ExtractionStrategy for ContentApiStrategy {
    fn name(&self) -> &'static str {
        "api"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Api
    }

    async fn extract(&self, url: &str, _feed: Option<&FeedItem>, _options: &Options) -> Result<Option<ExtractedContent>> {
        debug!(%url, "No content API configured");
        Ok(None)
    }
}

/// Generative summary phase. Runs when `use_ai_generation` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiSummaryStrategy;

#[async_trait]
impl ExtractionStrategy for AiSummaryStrategy {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::AiGenerated
    }

    fn enabled(&self, options: &Options) -> bool {
        options.use_ai_generation
    }

    async fn extract(&self, url: &str, _feed: Option<&FeedItem>, _options: &Options) -> Result<Option<ExtractedContent>> {
        debug!(%url, "No generative backend configured");
        Ok(None)
    }
}

/// The built-in phases in pipeline order: browser, content API, generative.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(BrowserStrategy),
        Box::new(ContentApiStrategy),
        Box::new(AiSummaryStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_and_methods() {
        let strategies = default_strategies();
        let names: Vec<_> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["browser", "api", "ai"]);
        assert_eq!(strategies[2].method(), ExtractionMethod::AiGenerated);
    }

    #[test]
    fn test_enabled_flags() {
        let options = Options::default();
        assert!(!BrowserStrategy.enabled(&options));
        assert!(ContentApiStrategy.enabled(&options));
        assert!(!AiSummaryStrategy.enabled(&options));

        let options = Options {
            use_browser_automation: true,
            use_ai_generation: true,
            ..Options::default()
        };
        assert!(BrowserStrategy.enabled(&options));
        assert!(AiSummaryStrategy.enabled(&options));
    }

    #[tokio::test]
    async fn test_stubs_yield_nothing() {
        let options = Options::default();
        for strategy in default_strategies() {
            let result = strategy.extract("https://example.com/a", None, &options).await;
            assert!(matches!(result, Ok(None)), "{}", strategy.name());
        }
    }
}
