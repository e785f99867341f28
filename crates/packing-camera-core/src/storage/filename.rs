use chrono::{DateTime, Local};

/// Extension used when the MIME type has no subtype.
pub const FALLBACK_EXTENSION: &str = "dat";

/// File extension for a MIME type: its subtype without parameters.
///
/// `video/webm;codecs=vp9` gives `webm`; `video` gives [`FALLBACK_EXTENSION`].
pub fn extension_for_mime(mime_type: &str) -> &str {
    let essence = mime_type.split(';').next().unwrap_or_default();

    match essence.split_once('/') {
        Some((_, subtype)) if !subtype.trim().is_empty() => subtype.trim(),
        _ => FALLBACK_EXTENSION,
    }
}

/// `{order_code}_{YYYY-MM-DD_HH-MM-SS}_recorded-video.{ext}` at local time `at`.
///
/// Characters that can't appear in a file name (path separators, `:*?"<>|`
/// and control characters) are replaced with `_`.
pub fn recording_filename(order_code: &str, mime_type: &str, at: DateTime<Local>) -> String {
    let name = format!(
        "{}_{}_recorded-video.{}",
        order_code,
        at.format("%Y-%m-%d_%H-%M-%S"),
        extension_for_mime(mime_type)
    );

    name.chars()
        .map(|c| if is_reserved(c) { '_' } else { c })
        .collect()
}

fn is_reserved(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}
