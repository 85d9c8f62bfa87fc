//! Resolution of user-supplied video references into canonical video IDs.
//!
//! Accepts full watch URLs, `youtu.be` short links, embed URLs and bare
//! 11-character IDs:
//!
//! ```rust,ignore
//! use yt_transcript_core::connectors::youtube::video_id::resolve_video_id;
//!
//! assert_eq!(resolve_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
//! assert_eq!(resolve_video_id("not a url"), None);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

static BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap());

/// Searched in order against the raw input; the first capture wins.
static URL_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        )
        .unwrap(),
        Regex::new(r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})").unwrap(),
    ]
});

/// Extract the video ID from a URL or return the input if it already is one.
///
/// Returns `None` when nothing matches. IDs pulled out of a parsed URL are
/// returned as-is, without checking them against the 11-character shape.
pub fn resolve_video_id(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }

    for pattern in URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|caps| caps.get(1)) {
            return Some(id.as_str().to_string());
        }
    }

    from_parsed_url(input).filter(|id| !id.is_empty())
}

fn from_parsed_url(input: &str) -> Option<String> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            debug!(input = %input, error = %e, "Input is not a parseable URL");
            return None;
        }
    };
    let host = url.host_str()?;

    if host.contains("youtu.be") {
        return Some(url.path().trim_start_matches('/').to_string());
    }

    if host.contains("youtube.com") {
        return url
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }

    None
}
