//! Image candidate gathering.
//!
//! Sources, in the order the pipeline consults them:
//! feed media, HTML patterns (structured data, `<img>`, `<picture>`, CSS
//! backgrounds) and a raw-text URL scan.

use dom_query::{Document, Selection};
use url::Url;

use super::ImageCandidate;
use crate::dom;
use crate::extractor::FeedItem;
use crate::formatter;
use crate::metadata::extract_json_ld;
use crate::patterns::{CSS_BACKGROUND_IMAGE, RAW_IMAGE_URL};
use crate::result::ImageSource;
use crate::url_utils::{parse_http_url, resolve_url};

/// `<img>` attributes holding the image URL, lazy-loading variants included.
const IMG_SRC_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src", "data-original", "data-url"];

/// Feed media (`media:content`, `media:thumbnail`, image enclosures) and
/// `<img>` tags inside the feed body.
#[must_use]
pub fn feed_candidates(item: &FeedItem, source_url: &str) -> Vec<ImageCandidate> {
    let base = parse_http_url(source_url);
    let mut out = Vec::new();

    let media = item
        .media_content
        .iter()
        .chain(&item.media_thumbnail)
        .chain(&item.enclosure)
        .filter(|m| m.is_image());
    for entry in media {
        if let Some(url) = resolve_url(&entry.url, base.as_ref()) {
            out.push(ImageCandidate {
                url,
                source: ImageSource::Feed,
                width: entry.width,
                height: entry.height,
            });
        }
    }

    for body in [&item.content_encoded, &item.content, &item.description]
        .into_iter()
        .flatten()
    {
        if formatter::looks_like_html(body) {
            out.extend(img_candidates(&Document::from(body.as_str()), base.as_ref(), ImageSource::Feed));
        }
    }

    out
}

/// Candidates from a fetched page: `og:image`/`twitter:image` and JSON-LD
/// images (tagged structured), then `<img>`, `<picture>` sources and CSS
/// backgrounds outside the boilerplate.
#[must_use]
pub fn html_candidates(html: &str, page_url: &str) -> Vec<ImageCandidate> {
    let base = parse_http_url(page_url);
    let doc = Document::from(html);
    let mut out = structured_candidates(&doc, base.as_ref());

    formatter::strip_boilerplate(&doc);
    out.extend(img_candidates(&doc, base.as_ref(), ImageSource::Html));
    out.extend(picture_candidates(&doc, base.as_ref()));
    out.extend(background_candidates(&doc, base.as_ref()));
    out
}

fn structured_candidates(doc: &Document, base: Option<&Url>) -> Vec<ImageCandidate> {
    let og_width = meta_dimension(doc, "og:image:width");
    let og_height = meta_dimension(doc, "og:image:height");

    let mut out = Vec::new();
    for (selector, has_size) in [
        ("meta[property='og:image']", true),
        ("meta[property='og:image:secure_url']", true),
        ("meta[name='twitter:image']", false),
        ("meta[name='twitter:image:src']", false),
        ("meta[property='twitter:image']", false),
    ] {
        let Some(url) = dom::get_attribute(&doc.select(selector), "content")
            .and_then(|src| resolve_url(&src, base))
        else {
            continue;
        };
        out.push(ImageCandidate {
            url,
            source: ImageSource::Structured,
            width: og_width.filter(|_| has_size),
            height: og_height.filter(|_| has_size),
        });
    }

    if let Some(article) = extract_json_ld(doc, false) {
        out.extend(article.images.iter().filter_map(|src| {
            resolve_url(src, base).map(|url| ImageCandidate::new(url, ImageSource::Structured))
        }));
    }

    out
}

fn meta_dimension(doc: &Document, property: &str) -> Option<u32> {
    dom::get_attribute(&doc.select(&format!("meta[property='{property}']")), "content")
        .and_then(|v| parse_dimension(&v))
}

fn img_candidates(doc: &Document, base: Option<&Url>, source: ImageSource) -> Vec<ImageCandidate> {
    doc.select("img")
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            let src = dom::first_attribute(&sel, IMG_SRC_ATTRIBUTES)
                .filter(|s| !s.starts_with("data:"))
                .or_else(|| dom::first_attribute(&sel, &["srcset", "data-srcset"]).and_then(|s| best_srcset_url(&s)))?;
            let url = resolve_url(&src, base)?;
            Some(ImageCandidate {
                url,
                source,
                width: dom::get_attribute(&sel, "width").and_then(|v| parse_dimension(&v)),
                height: dom::get_attribute(&sel, "height").and_then(|v| parse_dimension(&v)),
            })
        })
        .collect()
}

fn picture_candidates(doc: &Document, base: Option<&Url>) -> Vec<ImageCandidate> {
    doc.select("picture source[srcset], picture source[data-srcset]")
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            let srcset = dom::first_attribute(&sel, &["srcset", "data-srcset"])?;
            let url = resolve_url(&best_srcset_url(&srcset)?, base)?;
            Some(ImageCandidate::new(url, ImageSource::Html))
        })
        .collect()
}

fn background_candidates(doc: &Document, base: Option<&Url>) -> Vec<ImageCandidate> {
    doc.select("[style*='background']")
        .nodes()
        .iter()
        .filter_map(|node| {
            let style = dom::get_attribute(&Selection::from(*node), "style")?;
            let raw = CSS_BACKGROUND_IMAGE.captures(&style)?.get(1)?.as_str().trim().to_string();
            let url = resolve_url(&raw, base)?;
            Some(ImageCandidate::new(url, ImageSource::Html))
        })
        .collect()
}

/// URL with the largest width (or density) descriptor in a `srcset`.
#[must_use]
pub fn best_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?;
            let weight = parts
                .next()
                .and_then(|d| {
                    d.strip_suffix('w')
                        .or_else(|| d.strip_suffix('x'))
                        .and_then(|n| n.parse::<f64>().ok())
                })
                .unwrap_or(1.0);
            Some((weight, url))
        })
        .fold(None::<(f64, &str)>, |best, cur| match best {
            Some((w, _)) if w >= cur.0 => best,
            _ => Some(cur),
        })
        .map(|(_, url)| url.to_string())
}

/// Image URLs found anywhere in `text` by shape alone.
#[must_use]
pub fn scan_raw(text: &str) -> Vec<ImageCandidate> {
    RAW_IMAGE_URL
        .find_iter(text)
        .map(|m| ImageCandidate::new(m.as_str().replace("&amp;", "&"), ImageSource::Html))
        .collect()
}

/// Pixel dimension from an attribute value such as `"1200"` or `"1200px"`.
fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").trim().parse().ok().filter(|v| *v > 0)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::extractor::FeedMedia;

    const PAGE_URL: &str = "https://news.example.com/a/story";

    #[test]
    fn test_html_candidates_all_patterns() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn.example.com/og.jpg">
            <meta property="og:image:width" content="1200">
            <meta property="og:image:height" content="630">
            </head><body>
            <nav><img src="/logo.png"></nav>
            <article>
              <img data-src="/lazy/photo.jpg" width="800" height="450px">
              <picture><source srcset="/p-small.webp 480w, /p-large.webp 1600w"><img src="/p.jpg"></picture>
              <div style="background-image: url('/bg/hero.png')"></div>
            </article></body></html>"#;

        let candidates = html_candidates(html, PAGE_URL);
        let urls: Vec<_> = candidates.iter().map(|c| c.url.as_str()).collect();

        assert_eq!(urls[0], "https://cdn.example.com/og.jpg");
        assert_eq!(candidates[0].source, ImageSource::Structured);
        assert_eq!(candidates[0].width, Some(1200));
        assert!(urls.contains(&"https://news.example.com/lazy/photo.jpg"));
        assert!(urls.contains(&"https://news.example.com/p-large.webp"));
        assert!(urls.contains(&"https://news.example.com/bg/hero.png"));
        assert!(!urls.contains(&"https://news.example.com/logo.png"));

        let lazy = candidates.iter().find(|c| c.url.ends_with("photo.jpg")).expect("lazy image");
        assert_eq!((lazy.width, lazy.height), (Some(800), Some(450)));
    }

    #[test]
    fn test_feed_candidates_order_and_filter() {
        let item = FeedItem {
            media_content: vec![FeedMedia::new("https://x.test/main.jpg").with_size(1200, 800)],
            media_thumbnail: vec![FeedMedia::new("/thumb.jpg")],
            enclosure: vec![FeedMedia {
                media_type: Some("audio/mpeg".into()),
                ..FeedMedia::new("https://x.test/pod.mp3")
            }],
            content: Some(r#"<p>Body <img src="https://x.test/inline.png"></p>"#.into()),
            ..FeedItem::default()
        };

        let urls: Vec<_> = feed_candidates(&item, "https://x.test/post")
            .into_iter()
            .map(|c| c.url)
            .collect();
        assert_eq!(
            urls,
            ["https://x.test/main.jpg", "https://x.test/thumb.jpg", "https://x.test/inline.png"]
        );
    }

    #[test]
    fn test_best_srcset_url() {
        assert_eq!(best_srcset_url("a.jpg 1x, b.jpg 2x").as_deref(), Some("b.jpg"));
        assert_eq!(best_srcset_url("a.jpg 800w, b.jpg 400w").as_deref(), Some("a.jpg"));
        assert_eq!(best_srcset_url("only.jpg").as_deref(), Some("only.jpg"));
        assert_eq!(best_srcset_url(""), None);
    }

    #[test]
    fn test_scan_raw_finds_embedded_urls() {
        let text = r#"window.__DATA__ = {"hero":"https://media.example.com/2024/05/hero.jpg?w=1600","x":1};"#;
        let found = scan_raw(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://media.example.com/2024/05/hero.jpg?w=1600");
    }
}
