//! Pipeline orchestration.
//!
//! One call walks the phases in order and always resolves to a
//! [`PipelineResult`]:
//!
//! ```text
//! NotStarted → CacheChecked → HtmlTried → FeedTried → (strategies) → FallbackGenerated → Cached
//! ```
//!
//! Any phase whose candidate assesses as `high` jumps straight to `Cached`.
//! Phase failures are logged and recorded in the fallback reason, never
//! returned.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::assessor::assess;
use crate::cache::{Clock, ResultCache};
use crate::error::Result;
use crate::extractor::{default_strategies, extract_feed, extract_html, ExtractionStrategy, FeedItem};
use crate::fallback::{title_for_url, FallbackContent, FallbackGenerator, FallbackInput};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::formatter;
use crate::images::{self, collect, ImageCandidate, ImagePipeline};
use crate::options::Options;
use crate::result::{
    ContentQuality, ContentScore, ExtractedContent, ExtractionMethod, ImageInfo, ImageSource, PipelineResult,
    QualityLevel,
};
use crate::validator::score_content;

/// Where an invocation is in the phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    CacheChecked,
    HtmlTried,
    FeedTried,
    /// A pluggable strategy ran (by name).
    StrategyTried(&'static str),
    FallbackGenerated,
    Cached,
}

/// A scored phase output.
#[derive(Debug, Clone)]
struct Candidate {
    content: ExtractedContent,
    score: ContentScore,
    quality: ContentQuality,
}

/// Per-call state: the phase cursor, the page fetch memo and phase notes.
struct Invocation<'a> {
    url: &'a str,
    feed: Option<&'a FeedItem>,
    state: PipelineState,
    /// `None` until fetched; `Some(None)` when the fetch failed.
    page: Option<Option<String>>,
    images: Option<Vec<ImageInfo>>,
    notes: Vec<String>,
}

impl<'a> Invocation<'a> {
    fn new(url: &'a str, feed: Option<&'a FeedItem>) -> Self {
        Self {
            url,
            feed,
            state: PipelineState::NotStarted,
            page: None,
            images: None,
            notes: Vec::new(),
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state");
        self.state = next;
    }

    fn note(&mut self, phase: &str, reason: impl std::fmt::Display) {
        self.notes.push(format!("{phase}: {reason}"));
    }
}

/// The adaptive extraction orchestrator. Owns the result cache.
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    options: Options,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    cache: ResultCache,
    generator: FallbackGenerator,
    images: ImagePipeline,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("strategies", &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline over the network fetcher.
    pub fn new(options: Options) -> Result<Self> {
        let fetcher = HttpFetcher::new()?.with_backoff_base(options.backoff_base());
        Ok(Self::with_fetcher(Arc::new(fetcher), options))
    }

    /// Pipeline over any fetcher, with the built-in stub strategies.
    #[must_use]
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, options: Options) -> Self {
        Self {
            fetcher,
            cache: ResultCache::new(options.cache_ttl()),
            generator: FallbackGenerator::from_options(&options),
            images: ImagePipeline::from_options(&options),
            strategies: default_strategies(),
            options,
        }
    }

    /// Replace the cache clock. Existing entries are dropped.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = ResultCache::with_clock(self.options.cache_ttl(), clock);
        self
    }

    /// Append a strategy after the built-in ones.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Produce the best obtainable representation of the article at `url`.
    ///
    /// Never fails. On total failure the result has `success == false`, a
    /// populated `fallback_reason` and a minimal card linking to `url`.
    #[instrument(skip(self, feed), fields(has_feed = feed.is_some()))]
    pub async fn extract(&self, url: &str, feed: Option<&FeedItem>) -> PipelineResult {
        let mut run = Invocation::new(url, feed);

        if self.options.enable_caching {
            if let Some(cached) = self.cache.get(url) {
                return cached;
            }
        }
        run.advance(PipelineState::CacheChecked);

        let result = self.run_phases(&mut run).await;

        if self.options.enable_caching {
            self.cache.insert(url, result.clone());
        }
        run.advance(PipelineState::Cached);

        info!(
            method = %result.content.extraction_method,
            level = %result.quality.level,
            confidence = result.content.confidence,
            "Extraction finished"
        );
        result
    }

    async fn run_phases(&self, run: &mut Invocation<'_>) -> PipelineResult {
        let mut candidates: Vec<Candidate> = Vec::new();

        // HTML
        let html_candidate = self.html_phase(run).await;
        run.advance(PipelineState::HtmlTried);
        if let Some(candidate) = html_candidate {
            if candidate.quality.level == QualityLevel::High {
                return self.finish(run, candidate, None);
            }
            candidates.push(candidate);
        }

        // Feed
        if let Some(candidate) = self.feed_phase(run, !candidates.is_empty()).await {
            if candidate.quality.level == QualityLevel::High {
                return self.finish(run, candidate, None);
            }
            candidates.push(candidate);
        }
        run.advance(PipelineState::FeedTried);

        // Pluggable strategies
        for strategy in &self.strategies {
            if !strategy.enabled(&self.options) {
                continue;
            }
            match strategy.extract(run.url, run.feed, &self.options).await {
                Ok(Some(mut content)) => {
                    content.extraction_method = strategy.method();
                    let candidate = self.evaluate(run, content).await;
                    if candidate.quality.level == QualityLevel::High {
                        return self.finish(run, candidate, None);
                    }
                    candidates.push(candidate);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "Strategy failed");
                    run.note(strategy.name(), &err);
                }
            }
            run.advance(PipelineState::StrategyTried(strategy.name()));
        }

        // Fallback
        let best = self.best_candidate(run, candidates).await;
        let fallback = self.generator.generate(&FallbackInput {
            url: run.url,
            title: &best.content.title,
            description: &best.content.description,
            content: &best.content.content,
            score: &best.score,
            quality: &best.quality,
            author: best.content.author.as_deref(),
            source: best.content.source.as_deref(),
            published_at: best.content.published_at,
            images: run.images.as_deref().unwrap_or_default(),
            source_method: best.content.extraction_method,
            source_confidence: best.content.confidence,
        });
        run.advance(PipelineState::FallbackGenerated);

        self.finish(run, best, Some(fallback))
    }

    async fn html_phase(&self, run: &mut Invocation<'_>) -> Option<Candidate> {
        let html = self.page(run).await?;
        match extract_html(&html, run.url, &self.options) {
            Ok(content) => Some(self.evaluate(run, content).await),
            Err(err) => {
                debug!(error = %err, "HTML extraction found nothing");
                run.note("html", err);
                None
            }
        }
    }

    async fn feed_phase(&self, run: &mut Invocation<'_>, html_succeeded: bool) -> Option<Candidate> {
        let Some(feed) = run.feed else {
            return None;
        };
        if !self.options.fallback_to_rss {
            run.note("rss", "disabled");
            return None;
        }
        if self.options.strict_mode && html_succeeded {
            debug!("Strict mode: skipping feed after HTML extraction");
            return None;
        }

        match extract_feed(feed, run.url, &self.options) {
            Ok(content) => Some(self.evaluate(run, content).await),
            Err(err) => {
                run.note("rss", err);
                None
            }
        }
    }

    /// The page body, fetched at most once per invocation.
    async fn page(&self, run: &mut Invocation<'_>) -> Option<String> {
        if let Some(memo) = &run.page {
            return memo.clone();
        }

        let fetched = match self
            .fetcher
            .fetch(run.url, self.options.timeout(), self.options.max_retries)
            .await
        {
            Ok(html) => Some(html),
            Err(err) => {
                warn!(error = %err, "Fetch failed");
                run.note("fetch", err);
                None
            }
        };
        run.page = Some(fetched.clone());
        fetched
    }

    /// Attach ranked images, then score and assess.
    async fn evaluate(&self, run: &mut Invocation<'_>, mut content: ExtractedContent) -> Candidate {
        content.images = if self.options.include_images {
            self.ranked_images(run, &content)
                .await
                .iter()
                .map(|image| image.url.clone())
                .collect()
        } else {
            Vec::new()
        };

        let score = score_content(&content, &self.options);
        let quality = assess(&score, &self.options.thresholds);
        content.success = quality.level != QualityLevel::Minimal;
        content.confidence = content.confidence.clamp(0.0, 1.0);

        debug!(
            method = %content.extraction_method,
            confidence = score.overall_confidence,
            level = %quality.level,
            "Candidate assessed"
        );
        Candidate {
            content,
            score,
            quality,
        }
    }

    /// Gather and rank images once per invocation: feed media, page
    /// patterns, the candidate's own images, then a raw-text scan when
    /// nothing valid was found.
    async fn ranked_images(&self, run: &mut Invocation<'_>, content: &ExtractedContent) -> Vec<ImageInfo> {
        if let Some(images) = &run.images {
            return images.clone();
        }

        let mut candidates: Vec<ImageCandidate> = run
            .feed
            .map(|feed| collect::feed_candidates(feed, run.url))
            .unwrap_or_default();

        // Supplementary fetch only happens if no phase fetched the page yet.
        let page = self.page(run).await;
        if let Some(html) = &page {
            candidates.extend(collect::html_candidates(html, run.url));
        }

        let own_source = match content.extraction_method {
            ExtractionMethod::Rss => ImageSource::Feed,
            _ => ImageSource::Html,
        };
        candidates.extend(content.images.iter().map(|url| ImageCandidate::new(url.clone(), own_source)));

        let mut ranked = self.images.process(candidates, run.url);
        if ranked.is_empty() {
            let mut raw = collect::scan_raw(&content.content);
            if let Some(html) = &page {
                raw.extend(collect::scan_raw(html));
            }
            ranked = self.images.process(raw, run.url);
        }

        run.images = Some(ranked.clone());
        ranked
    }

    /// Highest `overall_confidence` wins; ties keep the earlier phase. With no
    /// candidate at all, an empty fallback record is scored.
    async fn best_candidate(&self, run: &mut Invocation<'_>, candidates: Vec<Candidate>) -> Candidate {
        let best = candidates.into_iter().fold(None::<Candidate>, |best, candidate| match best {
            Some(b) if b.score.overall_confidence >= candidate.score.overall_confidence => Some(b),
            _ => Some(candidate),
        });

        match best {
            Some(candidate) => candidate,
            None => {
                run.note("pipeline", "no phase produced content");
                self.evaluate(run, ExtractedContent::empty(ExtractionMethod::Fallback)).await
            }
        }
    }

    fn finish(&self, run: &Invocation<'_>, candidate: Candidate, fallback: Option<FallbackContent>) -> PipelineResult {
        let Candidate {
            mut content,
            score,
            quality,
        } = candidate;

        let stats = formatter::analyze(&content.content);
        let ranked = run.images.as_deref().unwrap_or_default();

        let mut hero_image = images::get_best_image(ranked).map(|image| image.url.clone());
        let mut fallback_reason = None;
        let mut rendered = None;

        if let Some(fallback) = fallback {
            content.title = fallback.title;
            if content.description.trim().is_empty() {
                content.description = fallback.description;
            }
            if content.content.trim().is_empty() {
                content.content = fallback.html.clone();
            }
            if hero_image.is_none() && self.options.use_visual_fallbacks {
                hero_image = fallback.images.first().cloned();
            }
            content.extraction_method = fallback.extraction_method;
            content.confidence = fallback.confidence.clamp(0.0, 1.0);

            let mut reason = fallback.fallback_reason;
            if !run.notes.is_empty() {
                reason = format!("{reason}; {}", run.notes.join("; "));
            }
            fallback_reason = Some(reason);
            rendered = Some(fallback.html);
        }

        if content.title.trim().is_empty() {
            content.title = formatter::first_plausible_line(&formatter::sanitize_text(&content.content, usize::MAX))
                .unwrap_or_else(|| title_for_url(run.url));
        }
        content.success = quality.level != QualityLevel::Minimal;

        PipelineResult {
            content,
            score,
            quality,
            fallback_reason,
            hero_image,
            word_count: stats.word_count,
            reading_time: stats.reading_time,
            language: stats.language,
            rendered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{MemoryFetcher, MemoryResponse};
    use crate::result::FallbackStrategy;
    use async_trait::async_trait;

    const URL: &str = "https://news.example.com/story";

    fn pipeline(fetcher: MemoryFetcher) -> (Arc<MemoryFetcher>, Pipeline) {
        let fetcher = Arc::new(fetcher);
        let pipeline = Pipeline::with_fetcher(fetcher.clone(), Options::default());
        (fetcher, pipeline)
    }

    #[tokio::test]
    async fn test_total_failure_yields_minimal_card() {
        let (_, pipeline) = pipeline(MemoryFetcher::new().with_response(URL, MemoryResponse::Status(500)));
        let result = pipeline.extract(URL, None).await;

        assert!(!result.content.success);
        assert_eq!(result.quality.level, QualityLevel::Minimal);
        assert_eq!(result.content.extraction_method, ExtractionMethod::Fallback);
        assert_eq!(result.content.title, "Article from news.example.com");
        assert!(!result.content.content.is_empty());
        assert!(result.rendered.as_deref().is_some_and(|h| h.contains(URL)));
        let reason = result.fallback_reason.unwrap_or_default();
        assert!(reason.contains("fetch:"), "{reason}");
    }

    #[tokio::test]
    async fn test_caching_can_be_disabled() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let options = Options {
            enable_caching: false,
            ..Options::default()
        };
        let pipeline = Pipeline::with_fetcher(fetcher.clone(), options);

        pipeline.extract(URL, None).await;
        pipeline.extract(URL, None).await;
        assert_eq!(fetcher.calls(), 2);
        assert!(pipeline.cache().is_empty());
    }

    #[tokio::test]
    async fn test_page_fetched_once_per_invocation() {
        let (fetcher, pipeline) = pipeline(
            MemoryFetcher::new().with_page(URL, "<html><body><p>Short text only.</p></body></html>"),
        );
        pipeline.extract(URL, None).await;
        assert_eq!(fetcher.calls(), 1);
    }

    struct FixedStrategy(ExtractedContent);

    #[async_trait]
    impl ExtractionStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::Api
        }

        async fn extract(&self, _url: &str, _feed: Option<&FeedItem>, _options: &Options) -> Result<Option<ExtractedContent>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn test_custom_strategy_provenance() {
        let sentence = "Analysts said the rally could extend into next week as volumes rise.";
        let body: String = (0..10).map(|_| format!("<p>{sentence} {sentence}</p>")).collect();
        let content = ExtractedContent {
            title: "Rally extends".into(),
            description: "Markets keep climbing.".into(),
            content: body,
            author: Some("Kim".into()),
            confidence: 0.8,
            ..ExtractedContent::empty(ExtractionMethod::Html)
        };

        let (_, pipeline) = pipeline(MemoryFetcher::new());
        let pipeline = pipeline.with_strategy(Box::new(FixedStrategy(content)));
        let result = pipeline.extract(URL, None).await;

        assert_eq!(result.content.extraction_method, ExtractionMethod::Api);
        assert_eq!(result.quality.level, QualityLevel::High);
        assert_eq!(result.quality.fallback_strategy, FallbackStrategy::FullContent);
        assert!(result.rendered.is_none());
        assert!(result.fallback_reason.is_none());
    }
}
