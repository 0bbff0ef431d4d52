//! Recovery of the video id and duration from the course page markup.
//!
//! The site exposes both values through several historically observed
//! encodings. Each extractor tries an ordered pattern list over the raw
//! text (most reliable shape first, first match wins); the video id
//! additionally falls back to a hidden form input in the parsed DOM.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Textual shapes the video id has been observed in, most reliable first.
const VIDEO_ID_PATTERNS: [&str; 4] = [
    r#"(?i)["']videoId["']\s*:\s*(\d+)"#,
    r#"(?i)videoId\s*[:=]\s*["']?(\d+)["']?"#,
    r#"(?i)data-video-id=["']?(\d+)["']?"#,
    r#"(?i)evaid=["']?(\d+)["']?"#,
];

/// Textual shapes the duration has been observed in, most reliable first.
const DURATION_PATTERNS: [&str; 3] = [
    r#"(?i)["']duration["']\s*:\s*(\d+)"#,
    r"(?i)duration\s*[:=]\s*(\d+)",
    r#"(?i)data-duration=["']?(\d+)["']?"#,
];

/// Hidden inputs the video id falls back to when no textual pattern matches.
const VIDEO_ID_INPUTS: [&str; 2] = ["input#videoId", r#"input[name="videoId"]"#];

/// Duration assumed when the page exposes none; a command-line override
/// takes precedence over both.
pub const DEFAULT_DURATION_SECS: u64 = 3000;

/// Recover the video id from the page, or `None` when the page carries no
/// recognizable encoding of it.
pub fn extract_video_id(html: &str) -> Option<String> {
    for pattern in VIDEO_ID_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(captures) = re.captures(html) {
                if let Some(found) = captures.get(1) {
                    debug!("Video id matched pattern {}", pattern);
                    return Some(found.as_str().to_string());
                }
            }
        }
    }

    // Structural fallback: a hidden input carrying the id. The first input
    // found decides, even when its value attribute is missing or empty.
    let document = Html::parse_document(html);
    for selector_str in VIDEO_ID_INPUTS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(input) = document.select(&selector).next() {
                debug!("Video id input found via {}", selector_str);
                return input
                    .value()
                    .attr("value")
                    .filter(|value| !value.is_empty())
                    .map(|value| value.to_string());
            }
        }
    }

    None
}

/// Recover the duration in seconds, degrading to a fixed default when the
/// page exposes none.
pub fn extract_duration(html: &str) -> u64 {
    for pattern in DURATION_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(captures) = re.captures(html) {
                if let Some(found) = captures.get(1) {
                    if let Ok(seconds) = found.as_str().parse::<u64>() {
                        debug!("Duration matched pattern {}", pattern);
                        return seconds;
                    }
                }
            }
        }
    }

    DEFAULT_DURATION_SECS
}
