use crate::output::Format;
use std::path::PathBuf;

/// Longest file stem produced by [`sanitize_filename`]
const MAX_STEM_CHARS: usize = 100;

/// Convert a URL to a sanitized filename stem
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let name = url
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_start_matches("file://")
        .trim_end_matches('/')
        .replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");

    let name: String = name.chars().take(MAX_STEM_CHARS).collect();
    if name.is_empty() {
        "table".to_string()
    } else {
        name
    }
}

/// Output path used when none is given: the sanitized listing URL plus the format's extension
pub fn default_output_path(listing_url: &str, format: Format) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        sanitize_filename(listing_url),
        format.extension()
    ))
}
