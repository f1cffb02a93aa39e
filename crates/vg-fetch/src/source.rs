//! Source URL validation and video-id extraction.
//!
//! The decoder accepts anything, so validation here is the gate that keeps
//! arbitrary strings from reaching a subprocess. A request is accepted when
//! it matches one of the recognized YouTube URL shapes or is a bare 11-char
//! video id.

use std::sync::LazyLock;

use regex::Regex;
use vg_core::{Error, Result};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([^&\n?#/]+)",
    )
    .expect("url pattern is valid")
});

static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]{11})$").expect("id pattern is valid"));

/// Extract the video id from a URL or bare-id string.
///
/// Returns `None` when the input matches no recognized shape.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some(caps) = URL_PATTERN.captures(input) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = BARE_ID_PATTERN.captures(input) {
        return Some(caps[1].to_string());
    }
    None
}

/// Validate a source URL, returning the extracted video id.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] for anything that is not a recognized
/// video-host URL.
pub fn validate_source_url(url: &str) -> Result<String> {
    extract_video_id(url)
        .ok_or_else(|| Error::InvalidRequest(format!("unrecognized video URL: {url}")))
}
