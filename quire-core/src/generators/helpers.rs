//! Text and file helpers shared by the artifact generators.

use crate::cancel::{CancellationToken, Cancelled};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Escape text for XML element content and attributes
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape text for HTML
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Last modification time of a file, if it can be read
pub fn file_modified(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Read a content file
///
/// Read failures are logged and give `None` so one bad file does not stop
/// a generator. Cancellation is checked first. A leading byte order mark is
/// dropped.
pub fn read_content_file(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Option<String>, Cancelled> {
    cancel.check()?;
    match fs::read_to_string(path) {
        Ok(contents) => match contents.strip_prefix('\u{feff}') {
            Some(stripped) => Ok(Some(stripped.to_string())),
            None => Ok(Some(contents)),
        },
        Err(e) => {
            tracing::warn!("Failed to read {:?}: {}", path, e);
            Ok(None)
        }
    }
}
