//! Response models and the assembler that turns extracted fragments
//! into the final download envelope.

use serde::Serialize;
use url::Url;

use crate::extract::ExtractedMedia;

/// Upstream identifier reported in every envelope.
pub const SOURCE_OF_DATA: &str = "GetMedia";

/// Path segments that can never be a username in an Instagram URL.
const RESERVED_SEGMENTS: &[&str] = &["p", "reel", "reels", "stories", "explore", "tv"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Post,
    Reel,
    Story,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub media_url: String,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub status: String,
    pub media: Vec<MediaRecord>,
    pub media_count: usize,
    pub username: String,
    pub requested_url: String,
    pub source_of_data: String,
}

/// Classify a request URL by its path shape.
pub fn source_type_from_url(url: &str) -> SourceType {
    let lower = url.to_lowercase();
    if lower.contains("/reel") {
        SourceType::Reel
    } else if lower.contains("/stories/") {
        SourceType::Story
    } else {
        SourceType::Post
    }
}

/// Pull a username out of the request URL path. A leading reserved
/// segment means the path carries only a shortcode, except for story
/// URLs where the username follows the `stories` marker.
pub fn username_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let first = segments.first()?;

    if first.eq_ignore_ascii_case("stories") {
        return segments.get(1).map(|s| s.to_string());
    }
    if RESERVED_SEGMENTS.contains(&first.to_lowercase().as_str()) {
        return None;
    }
    Some(first.to_string())
}

/// Map extracted fragments into the final envelope. The resolver strips
/// captions and timestamps, so those stay absent.
pub fn build_response(
    extracted: Vec<ExtractedMedia>,
    markup_username: Option<String>,
    requested_url: &str,
) -> DownloadResponse {
    let source_type = source_type_from_url(requested_url);

    let media: Vec<MediaRecord> = extracted
        .into_iter()
        .map(|item| MediaRecord {
            caption: None,
            media_url: item.media_url,
            source_type,
            thumbnail_url: item.thumbnail_url,
            timestamp: None,
            media_type: item.media_type,
        })
        .collect();

    let username = markup_username
        .or_else(|| username_from_url(requested_url))
        .unwrap_or_else(|| "unknown".to_string());

    DownloadResponse {
        status: "ok".to_string(),
        media_count: media.len(),
        media,
        username,
        requested_url: requested_url.to_string(),
        source_of_data: SOURCE_OF_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_from_url() {
        assert_eq!(
            source_type_from_url("https://instagram.com/p/ABC123/"),
            SourceType::Post
        );
        assert_eq!(
            source_type_from_url("https://www.instagram.com/reel/XYZ/"),
            SourceType::Reel
        );
        assert_eq!(
            source_type_from_url("https://www.instagram.com/reels/XYZ/"),
            SourceType::Reel
        );
        assert_eq!(
            source_type_from_url("https://instagram.com/stories/someone/321/"),
            SourceType::Story
        );
    }

    #[test]
    fn test_username_from_url_skips_reserved_segments() {
        assert_eq!(
            username_from_url("https://instagram.com/somebody/p/ABC123/").as_deref(),
            Some("somebody")
        );
        assert_eq!(
            username_from_url("https://instagram.com/stories/somebody/123/").as_deref(),
            Some("somebody")
        );
        assert_eq!(username_from_url("https://instagram.com/p/ABC123/"), None);
        assert_eq!(username_from_url("https://instagram.com/reel/XYZ/"), None);
        assert_eq!(username_from_url("not a url"), None);
    }

    #[test]
    fn test_build_response_counts_and_defaults() {
        let extracted = vec![ExtractedMedia {
            media_url: "https://cdn.x/v.mp4".to_string(),
            thumbnail_url: None,
            media_type: MediaType::Video,
        }];
        let resp = build_response(extracted, None, "https://instagram.com/reel/ABC/");

        assert_eq!(resp.status, "ok");
        assert_eq!(resp.media_count, 1);
        assert_eq!(resp.media.len(), 1);
        assert_eq!(resp.media[0].source_type, SourceType::Reel);
        assert_eq!(resp.username, "unknown");
        assert_eq!(resp.source_of_data, "GetMedia");
        assert!(resp.media[0].caption.is_none());
        assert!(resp.media[0].timestamp.is_none());
    }

    #[test]
    fn test_build_response_prefers_markup_username() {
        let resp = build_response(
            Vec::new(),
            Some("from_markup".to_string()),
            "https://instagram.com/from_url/p/ABC/",
        );
        assert_eq!(resp.username, "from_markup");
        assert_eq!(resp.media_count, 0);
        assert_eq!(resp.status, "ok");
    }
}
