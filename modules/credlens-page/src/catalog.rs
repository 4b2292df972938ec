use std::collections::HashMap;

use tracing::debug;

use credlens_common::MediaDescriptor;

use crate::dom::{Document, Element, ElementId};

/// How far outside the viewport (above or below) an element may sit and
/// still count as near-visible. A cheap heuristic, not exact intersection.
const VIEWPORT_SLACK_PX: f32 = 1000.0;

/// Video-hosting domains recognized inside iframe embeds.
const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "twitch.tv",
    "tiktok.com",
    "instagram.com",
];

/// One page scan: discovered media in document order plus the index from
/// source URL back to the hosting elements for badge placement. A fresh scan
/// fully replaces the previous catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    pub media: Vec<MediaDescriptor>,
    index: HashMap<String, Vec<ElementId>>,
}

impl Catalog {
    /// Elements bound to a source URL, in discovery order.
    pub fn elements_for(&self, src: &str) -> &[ElementId] {
        self.index.get(src).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    fn bind(&mut self, src: &str, id: ElementId) {
        self.index.entry(src.to_string()).or_default().push(id);
    }
}

/// Scan a document for eligible image, video, and iframe-embedded media.
pub fn scan(doc: &Document) -> Catalog {
    let mut catalog = Catalog::default();

    for (id, element) in doc.iter() {
        if !is_visible_and_valid(doc, element) {
            continue;
        }

        match element.tag() {
            // Covers plain <img> and <picture><img> alike: picture children
            // are regular img elements in the tree walk.
            "img" => {
                let Some(src) = element.get_attr("src").filter(|s| !s.is_empty()) else {
                    continue;
                };
                let src = resolve_url(doc, src);
                let alt = element
                    .get_attr("alt")
                    .filter(|a| !a.is_empty())
                    .map(str::to_owned);
                catalog.media.push(MediaDescriptor::image(&src, alt));
                catalog.bind(&src, id);
            }
            "video" => {
                let Some(src) = first_source_child(doc, id) else {
                    continue;
                };
                let src = resolve_url(doc, &src);
                catalog.media.push(MediaDescriptor::video(&src, None));
                catalog.bind(&src, id);
            }
            "iframe" => {
                if !is_media_iframe(element) {
                    continue;
                }
                let Some(src) = element.get_attr("src").filter(|s| !s.is_empty()) else {
                    continue;
                };
                let src = resolve_url(doc, src);
                let platform = media_platform(&src);
                catalog
                    .media
                    .push(MediaDescriptor::video(&src, Some(platform)));
                catalog.bind(&src, id);
            }
            _ => {}
        }
    }

    debug!(count = catalog.len(), "Media scan complete");
    catalog
}

/// Eligibility: rendered box has area, element is not hidden, and it lies
/// within `VIEWPORT_SLACK_PX` of the viewport.
fn is_visible_and_valid(doc: &Document, element: &Element) -> bool {
    let rect = element.bounding_rect();
    let style = element.computed_style();

    if rect.width == 0.0 || rect.height == 0.0 {
        return false;
    }
    if style.display == "none" || style.visibility == "hidden" {
        return false;
    }
    if style.opacity == 0.0 {
        return false;
    }

    rect.top < doc.viewport_height() + VIEWPORT_SLACK_PX && rect.bottom > -VIEWPORT_SLACK_PX
}

/// Resolve a possibly-relative URL against the page origin.
fn resolve_url(doc: &Document, url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("{}//{}", doc.scheme(), rest)
    } else if url.starts_with('/') {
        format!("{}{}", doc.origin(), url)
    } else {
        format!("{}/{}", doc.origin(), url)
    }
}

/// First `<source>` child of a `<video>` with a non-empty src.
fn first_source_child(doc: &Document, video: ElementId) -> Option<String> {
    for child in doc.children(video) {
        let element = doc.element(child)?;
        if element.tag() == "source" {
            return element
                .get_attr("src")
                .filter(|s| !s.is_empty())
                .map(str::to_owned);
        }
    }
    None
}

fn is_media_iframe(element: &Element) -> bool {
    let src = element.get_attr("src").unwrap_or_default();
    if VIDEO_HOSTS.iter().any(|host| src.contains(host)) {
        return true;
    }
    // Fallback: players named after what they embed.
    element.get_attr("class").unwrap_or_default().contains("video")
        || element.get_attr("id").unwrap_or_default().contains("video")
}

fn media_platform(url: &str) -> String {
    let label = if url.contains("youtube") || url.contains("youtu.be") {
        "YouTube"
    } else if url.contains("vimeo") {
        "Vimeo"
    } else if url.contains("dailymotion") {
        "Dailymotion"
    } else if url.contains("twitch") {
        "Twitch"
    } else if url.contains("tiktok") {
        "TikTok"
    } else if url.contains("instagram") {
        "Instagram"
    } else {
        "Video Platform"
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ComputedStyle, Rect};
    use credlens_common::MediaType;

    fn visible_rect() -> Rect {
        Rect::new(320.0, 240.0, 100.0)
    }

    #[test]
    fn visible_img_scanned_hidden_img_skipped() {
        let mut doc = Document::new("https://example.com");
        doc.append(
            None,
            Element::new("img").attr("src", "/a.png").rect(visible_rect()),
        );
        doc.append(
            None,
            Element::new("img")
                .attr("src", "/b.png")
                .rect(visible_rect())
                .computed(ComputedStyle {
                    display: "none".to_string(),
                    ..ComputedStyle::default()
                }),
        );

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.media[0].src, "https://example.com/a.png");
        assert_eq!(catalog.media[0].media_type, MediaType::Image);
    }

    #[test]
    fn zero_size_and_transparent_elements_skipped() {
        let mut doc = Document::new("https://example.com");
        doc.append(None, Element::new("img").attr("src", "/zero.png"));
        doc.append(
            None,
            Element::new("img")
                .attr("src", "/ghost.png")
                .rect(visible_rect())
                .computed(ComputedStyle {
                    opacity: 0.0,
                    ..ComputedStyle::default()
                }),
        );

        assert!(scan(&doc).is_empty());
    }

    #[test]
    fn far_offscreen_elements_skipped() {
        let mut doc = Document::new("https://example.com").with_viewport_height(900.0);
        // 900 + 1000 slack = 1900; top beyond that is out.
        doc.append(
            None,
            Element::new("img")
                .attr("src", "/far.png")
                .rect(Rect::new(100.0, 100.0, 2500.0)),
        );
        // Just inside the slack window.
        doc.append(
            None,
            Element::new("img")
                .attr("src", "/near.png")
                .rect(Rect::new(100.0, 100.0, 1500.0)),
        );

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.media[0].src, "https://example.com/near.png");
    }

    #[test]
    fn url_resolution_forms() {
        let mut doc = Document::new("https://example.com");
        for src in [
            "https://cdn.example.com/x.png",
            "//cdn.example.com/y.png",
            "/z.png",
            "w.png",
        ] {
            doc.append(None, Element::new("img").attr("src", src).rect(visible_rect()));
        }

        let catalog = scan(&doc);
        let srcs: Vec<&str> = catalog.media.iter().map(|m| m.src.as_str()).collect();
        assert_eq!(
            srcs,
            vec![
                "https://cdn.example.com/x.png",
                "https://cdn.example.com/y.png",
                "https://example.com/z.png",
                "https://example.com/w.png",
            ]
        );
    }

    #[test]
    fn video_uses_first_source_child() {
        let mut doc = Document::new("https://example.com");
        let video = doc.append(None, Element::new("video").rect(visible_rect()));
        doc.append(Some(video), Element::new("source").attr("src", "/clip.webm"));
        doc.append(Some(video), Element::new("source").attr("src", "/clip.mp4"));
        // Video without any source yields nothing.
        doc.append(None, Element::new("video").rect(visible_rect()));

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.media[0].src, "https://example.com/clip.webm");
        assert_eq!(catalog.media[0].media_type, MediaType::Video);
        assert_eq!(catalog.elements_for("https://example.com/clip.webm"), &[video]);
    }

    #[test]
    fn iframe_allowlist_and_class_fallback() {
        let mut doc = Document::new("https://example.com");
        doc.append(
            None,
            Element::new("iframe")
                .attr("src", "https://www.youtube.com/embed/abc123")
                .rect(visible_rect()),
        );
        doc.append(
            None,
            Element::new("iframe")
                .attr("src", "https://player.example.net/x")
                .attr("class", "video-player")
                .rect(visible_rect()),
        );
        doc.append(
            None,
            Element::new("iframe")
                .attr("src", "https://ads.example.net/banner")
                .rect(visible_rect()),
        );

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.media[0].platform.as_deref(), Some("YouTube"));
        assert_eq!(catalog.media[1].platform.as_deref(), Some("Video Platform"));
    }

    #[test]
    fn picture_img_counted_once() {
        let mut doc = Document::new("https://example.com");
        let picture = doc.append(None, Element::new("picture").rect(visible_rect()));
        doc.append(
            Some(picture),
            Element::new("img").attr("src", "/hero.png").rect(visible_rect()),
        );

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn index_tracks_duplicate_sources() {
        let mut doc = Document::new("https://example.com");
        let a = doc.append(None, Element::new("img").attr("src", "/a.png").rect(visible_rect()));
        let b = doc.append(None, Element::new("img").attr("src", "/a.png").rect(visible_rect()));

        let catalog = scan(&doc);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.elements_for("https://example.com/a.png"), &[a, b]);
    }
}
