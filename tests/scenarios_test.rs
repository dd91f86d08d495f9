//! End-to-end pipeline scenarios over an in-memory fetcher.

#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use std::sync::Arc;

use rs_newsextract::{
    ExtractionMethod, FallbackStrategy, FeedItem, MemoryFetcher, MemoryResponse, Options, Pipeline, QualityLevel,
};

const ARTICLE_URL: &str = "https://news.example.com/markets/bitcoin-record";
const SENTENCE: &str = "Analysts said the rally could extend into next week as trading volumes rise.";

fn article_body(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|_| format!("{SENTENCE} {SENTENCE}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn news_article_page() -> String {
    let json_ld = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "NewsArticle",
        "headline": "Bitcoin hits a record high",
        "description": "The largest cryptocurrency set a new all-time high on Monday.",
        "author": { "@type": "Person", "name": "Jane Doe" },
        "datePublished": "2024-03-11T09:30:00Z",
        "image": "https://cdn.example.com/images/btc-hero.jpg",
        "articleBody": article_body(6),
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Bitcoin hits a record high | Example News</title>
    <meta property="og:image" content="https://cdn.example.com/images/btc-hero.jpg">
    <meta property="og:image:width" content="1200">
    <meta property="og:image:height" content="630">
    <script type="application/ld+json">{json_ld}</script>
</head>
<body>
    <nav><a href="/">Home</a> <a href="/markets">Markets</a></nav>
    <article><h1>Bitcoin hits a record high</h1><p>{SENTENCE}</p></article>
    <footer>Copyright Example News</footer>
</body>
</html>"#
    )
}

fn pipeline(fetcher: MemoryFetcher) -> (Arc<MemoryFetcher>, Pipeline) {
    let fetcher = Arc::new(fetcher);
    let pipeline = Pipeline::with_fetcher(fetcher.clone(), Options::default());
    (fetcher, pipeline)
}

#[tokio::test]
async fn test_structured_news_article_is_high_quality() {
    let (fetcher, pipeline) = pipeline(MemoryFetcher::new().with_page(ARTICLE_URL, news_article_page()));

    let result = pipeline.extract(ARTICLE_URL, None).await;

    assert_eq!(result.quality.level, QualityLevel::High, "{:?}", result.score);
    assert_eq!(result.quality.fallback_strategy, FallbackStrategy::FullContent);
    assert_eq!(result.content.extraction_method, ExtractionMethod::Html);
    assert!((result.content.confidence - 0.9).abs() < 1e-9);
    assert!(result.content.success);

    assert_eq!(result.content.title, "Bitcoin hits a record high");
    assert_eq!(result.content.author.as_deref(), Some("Jane Doe"));
    assert!(result.content.published_at.is_some());
    assert!(result.content.content.contains("<p>"));
    assert!(result.score.text_length >= 500);

    assert_eq!(
        result.hero_image.as_deref(),
        Some("https://cdn.example.com/images/btc-hero.jpg")
    );
    assert_eq!(result.content.images.len(), 1, "og:image and JSON-LD image dedupe");

    assert!(result.rendered.is_none());
    assert!(result.fallback_reason.is_none());
    assert_eq!(result.language.as_deref(), Some("en"));
    assert!(result.word_count > 100);
    assert!(result.reading_time >= 1);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_stalled_page_falls_back_to_feed_preview() {
    let description = "Bitcoin climbed above seventy thousand dollars on Monday as traders priced in steady fund inflows. \
                       Analysts said the rally could extend into next week if volumes keep rising. \
                       Smaller tokens followed the move with gains across most major exchanges today.";
    assert!(description.chars().count() > 240);

    let feed = FeedItem {
        title: Some("Bitcoin tops seventy thousand".into()),
        description: Some(description.into()),
        creator: Some("Sam Lee".into()),
        ..FeedItem::default()
    };
    let (fetcher, pipeline) = pipeline(MemoryFetcher::new().with_response(ARTICLE_URL, MemoryResponse::Stall));

    let result = pipeline.extract(ARTICLE_URL, Some(&feed)).await;

    assert_eq!(result.quality.level, QualityLevel::Medium, "{:?}", result.score);
    assert_eq!(result.quality.fallback_strategy, FallbackStrategy::EnhancedPreview);
    assert_eq!(result.content.extraction_method, ExtractionMethod::Rss);
    assert!((result.content.confidence - 0.7).abs() < 1e-9);
    assert!(result.content.success);
    assert_eq!(result.content.title, "Bitcoin tops seventy thousand");

    let rendered = result.rendered.expect("preview block");
    assert!(rendered.contains("Read full article"));
    assert!(rendered.contains(ARTICLE_URL));

    let reason = result.fallback_reason.expect("fallback reason");
    assert!(reason.contains("fetch:"), "{reason}");

    // The image gathering pass reuses the failed fetch.
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_short_page_without_images_is_minimal() {
    let page = "<html><body><p>Short note about markets today.</p></body></html>";
    let (_, pipeline) = pipeline(MemoryFetcher::new().with_page(ARTICLE_URL, page));

    let result = pipeline.extract(ARTICLE_URL, None).await;

    assert_eq!(result.quality.level, QualityLevel::Minimal);
    assert_eq!(result.quality.fallback_strategy, FallbackStrategy::ExternalLink);
    assert_eq!(result.content.extraction_method, ExtractionMethod::Fallback);
    assert!(result.content.confidence <= 0.3);
    assert!(!result.content.success);
    assert!(!result.content.title.is_empty());
    assert!(!result.content.content.is_empty());
    assert!(result.rendered.as_deref().is_some_and(|html| html.contains(ARTICLE_URL)));
    assert!(result.quality.issues.iter().any(|i| i.starts_with("Content too short")));
}

#[tokio::test]
async fn test_page_images_are_ranked_and_filtered() {
    let paragraphs: String = (0..8).map(|_| format!("<p>{SENTENCE} {SENTENCE}</p>")).collect();
    let page = format!(
        r#"<html><head><title>Ether upgrade ships</title></head><body>
        <article>
            <img src="/images/icon.png" width="80" height="80">
            <h1>Ether upgrade ships</h1>
            {paragraphs}
            <img src="/images/photo-large.jpg" width="1200" height="800">
        </article>
        </body></html>"#
    );
    let (_, pipeline) = pipeline(MemoryFetcher::new().with_page(ARTICLE_URL, page));

    let result = pipeline.extract(ARTICLE_URL, None).await;

    assert_eq!(
        result.content.images,
        vec!["https://news.example.com/images/photo-large.jpg".to_string()]
    );
    assert_eq!(
        result.hero_image.as_deref(),
        Some("https://news.example.com/images/photo-large.jpg")
    );
}

#[tokio::test]
async fn test_unknown_url_still_yields_renderable_result() {
    let (_, pipeline) = pipeline(MemoryFetcher::new());

    let result = pipeline.extract("https://www.example.org/missing", None).await;

    assert!(!result.content.success);
    assert_eq!(result.content.title, "Article from example.org");
    assert!((0.0..=1.0).contains(&result.content.confidence));
    assert!((0.0..=1.0).contains(&result.score.overall_confidence));
    assert!(!result.content.content.is_empty());
}

#[tokio::test]
async fn test_feed_disabled_is_noted() {
    let feed = FeedItem {
        title: Some("Headline only".into()),
        ..FeedItem::default()
    };
    let options = Options {
        fallback_to_rss: false,
        ..Options::default()
    };
    let pipeline = Pipeline::with_fetcher(Arc::new(MemoryFetcher::new()), options);

    let result = pipeline.extract(ARTICLE_URL, Some(&feed)).await;

    assert_ne!(result.content.extraction_method, ExtractionMethod::Rss);
    let reason = result.fallback_reason.expect("fallback reason");
    assert!(reason.contains("rss: disabled"), "{reason}");
}

#[tokio::test]
async fn test_strict_mode_ignores_loose_schema_types() {
    let json_ld = serde_json::json!({
        "@type": "BlogPosting",
        "headline": "Loose type",
        "articleBody": article_body(4),
    });
    let page = format!(
        r#"<html><head><script type="application/ld+json">{json_ld}</script></head>
        <body><p>Body text.</p></body></html>"#
    );

    let loose = Pipeline::with_fetcher(
        Arc::new(MemoryFetcher::new().with_page(ARTICLE_URL, page.clone())),
        Options::default(),
    );
    let strict = Pipeline::with_fetcher(
        Arc::new(MemoryFetcher::new().with_page(ARTICLE_URL, page)),
        Options {
            strict_mode: true,
            ..Options::default()
        },
    );

    let loose = loose.extract(ARTICLE_URL, None).await;
    let strict = strict.extract(ARTICLE_URL, None).await;

    assert_eq!(loose.content.title, "Loose type");
    assert!(loose.score.text_length > strict.score.text_length);
}

#[tokio::test]
async fn test_visual_fallback_hero_comes_from_bank() {
    let feed = FeedItem {
        title: Some("Ethereum staking update".into()),
        description: Some(
            "Validators queue grows as staking demand rises across the network this month. \
             Exit requests fell to their lowest level since the upgrade."
                .into(),
        ),
        ..FeedItem::default()
    };
    let (_, pipeline) = pipeline(MemoryFetcher::new());

    let result = pipeline.extract(ARTICLE_URL, Some(&feed)).await;

    assert_eq!(result.quality.level, QualityLevel::Low, "{:?}", result.score);
    assert_eq!(result.quality.fallback_strategy, FallbackStrategy::VisualCard);
    assert!(result.content.images.is_empty());
    assert!(result.rendered.as_deref().is_some_and(|html| html.contains("Save for later")));
    let hero = result.hero_image.expect("bank image");
    assert!(hero.starts_with("/images/fallback/"), "{hero}");
}

#[tokio::test]
async fn test_feed_media_becomes_hero_image() {
    let feed = FeedItem {
        title: Some("Solana outage resolved".into()),
        description: Some("Block production resumed after five hours of downtime on the network.".into()),
        media_content: vec![
            rs_newsextract::FeedMedia::new("https://cdn.example.com/sol-thumb.jpg").with_size(150, 150),
            rs_newsextract::FeedMedia::new("https://cdn.example.com/sol.jpg").with_size(1200, 675),
        ],
        ..FeedItem::default()
    };
    let (_, pipeline) = pipeline(MemoryFetcher::new().with_response(ARTICLE_URL, MemoryResponse::Status(503)));

    let result = pipeline.extract(ARTICLE_URL, Some(&feed)).await;

    assert_eq!(result.content.images, vec!["https://cdn.example.com/sol.jpg".to_string()]);
    assert_eq!(result.hero_image.as_deref(), Some("https://cdn.example.com/sol.jpg"));
    // A real image lifts an otherwise short item out of the minimal level.
    assert_eq!(result.quality.level, QualityLevel::Low, "{:?}", result.score);
}
