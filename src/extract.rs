//! Markup extraction: find media containers in the resolver's markup
//! and resolve the strongest link, thumbnail, and type for each.
//!
//! The resolver's markup varies between response formats, so discovery
//! and link resolution are ordered strategy tables walked until one
//! yields a result, rather than a fixed selector.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::media::{username_from_url, MediaType};

/// Thumbnail value the resolver ships while the real image is lazy
/// loading. Treated as absent.
pub const LOADER_PLACEHOLDER: &str = "img/loading.gif";

/// Container discovery, in priority order: dedicated media-item
/// elements, then items inside the download box, then any list item.
const CONTAINER_SELECTORS: &[&str] = &[".download-items", ".download-box li", "li"];

/// Lazy-load attribute wins over the eager src.
const THUMBNAIL_ATTRS: &[&str] = &["data-src", "src", "data-lazy-src"];

type LinkStrategy = fn(ElementRef) -> Option<String>;

/// Link resolution, in priority order.
const LINK_STRATEGIES: &[(&str, LinkStrategy)] = &[
    ("quality-selector", quality_selector_link),
    ("call-to-action", call_to_action_link),
    ("download-text", download_text_link),
    ("any-anchor", any_anchor_link),
];

/// One deliverable asset discovered in the markup.
#[derive(Debug, Clone)]
pub struct ExtractedMedia {
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub media_type: MediaType,
}

/// Walk the markup tree and resolve every container that yields a
/// usable link. Containers without one are skipped silently.
pub fn extract_media(markup: &str) -> (Vec<ExtractedMedia>, Option<String>) {
    let doc = Html::parse_document(markup);

    let mut items = Vec::new();
    for container in discover_containers(&doc) {
        let media_url = match resolve_link(container) {
            Some(url) => url,
            None => continue,
        };

        let thumbnail_url = resolve_thumbnail(container).map(|thumb| {
            if thumb.contains(LOADER_PLACEHOLDER) {
                media_url.clone()
            } else {
                thumb
            }
        });

        let media_type = infer_media_type(container, &media_url);
        items.push(ExtractedMedia {
            media_url,
            thumbnail_url,
            media_type,
        });
    }

    let username = profile_username(&doc);
    debug!(
        containers = items.len(),
        username_found = username.is_some(),
        "markup extraction finished"
    );
    (items, username)
}

fn discover_containers(doc: &Html) -> Vec<ElementRef<'_>> {
    for raw in CONTAINER_SELECTORS {
        let selector = Selector::parse(raw).expect("container selector");
        let found: Vec<ElementRef> = doc.select(&selector).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn resolve_link(container: ElementRef) -> Option<String> {
    for (name, strategy) in LINK_STRATEGIES {
        if let Some(url) = strategy(container) {
            debug!(strategy = name, "link resolved");
            return Some(url);
        }
    }
    None
}

/// A `<select>` offering explicit quality variants; the first option is
/// the highest quality.
fn quality_selector_link(container: ElementRef) -> Option<String> {
    let selector = Selector::parse("select option[value]").expect("option selector");
    container
        .select(&selector)
        .filter_map(|opt| opt.value().attr("value"))
        .map(clean_url)
        .find(|url| is_usable_url(url))
}

fn call_to_action_link(container: ElementRef) -> Option<String> {
    let selector = Selector::parse("a.abutton[href]").expect("abutton selector");
    container
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(clean_url)
        .find(|url| is_usable_url(url))
}

fn download_text_link(container: ElementRef) -> Option<String> {
    let selector = Selector::parse("a[href]").expect("anchor selector");
    container
        .select(&selector)
        .filter(|a| {
            a.text()
                .collect::<String>()
                .to_lowercase()
                .contains("download")
        })
        .filter_map(|a| a.value().attr("href"))
        .map(clean_url)
        .find(|url| is_usable_url(url))
}

fn any_anchor_link(container: ElementRef) -> Option<String> {
    let selector = Selector::parse("a[href]").expect("anchor selector");
    container
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(clean_url)
        .find(|url| is_usable_url(url))
}

fn resolve_thumbnail(container: ElementRef) -> Option<String> {
    let selector = Selector::parse("img").expect("img selector");
    let img = container.select(&selector).next()?;
    THUMBNAIL_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(clean_url)
        .find(|url| !url.is_empty())
}

fn infer_media_type(container: ElementRef, media_url: &str) -> MediaType {
    let selector = Selector::parse("i[class]").expect("icon selector");
    for icon in container.select(&selector) {
        for class in icon.value().classes() {
            match class {
                "icon-dlvideo" | "icon-video" => return MediaType::Video,
                "icon-dlimage" | "icon-image" => return MediaType::Image,
                _ => {}
            }
        }
    }

    let text = container.text().collect::<String>().to_lowercase();
    let path = media_url.split(['?', '#']).next().unwrap_or(media_url);
    if text.contains("video") || path.ends_with(".mp4") {
        return MediaType::Video;
    }
    MediaType::Image
}

/// Look for a profile-link anchor in the markup and read the username
/// off its href.
fn profile_username(doc: &Html) -> Option<String> {
    let selector = Selector::parse(r#"a[href*="instagram.com"]"#).expect("profile selector");
    doc.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(username_from_url)
}

/// Resolver URLs arrive with stray quote/backslash padding.
fn clean_url(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '\\')
        .to_string()
}

fn is_usable_url(url: &str) -> bool {
    !url.is_empty() && url != "#" && !url.to_lowercase().contains("javascript:")
}
