//! Slug generation and filename-to-slug resolution.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();
static INVALID_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();
static DASH_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

fn separator_regex() -> &'static Regex {
    SEPARATOR_REGEX.get_or_init(|| Regex::new(r"[\s_]+").unwrap())
}

fn invalid_chars_regex() -> &'static Regex {
    INVALID_CHARS_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9\-.]").unwrap())
}

fn dash_run_regex() -> &'static Regex {
    DASH_RUN_REGEX.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert arbitrary text to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace runs of whitespace and underscores with a hyphen
/// - Remove everything except `a-z`, `0-9`, `-` and `.`
/// - Collapse multiple hyphens
/// - Fold `-.` and `.-` into `.`
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use quire_core::generate_slug;
///
/// assert_eq!(generate_slug("Hello World"), "hello-world");
/// assert_eq!(generate_slug("What's New in C# 12?"), "whats-new-in-c-12");
/// assert_eq!(generate_slug("Migrating to .NET 8"), "migrating-to.net-8");
/// ```
pub fn generate_slug(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lowercased = text.to_lowercase();
    let hyphenated = separator_regex().replace_all(&lowercased, "-");
    let cleaned = invalid_chars_regex().replace_all(&hyphenated, "");
    let collapsed = dash_run_regex().replace_all(&cleaned, "-");

    collapsed
        .replace("-.", ".")
        .replace(".-", ".")
        .trim_matches('-')
        .to_string()
}

/// Derive the page slug from a content file name
///
/// Accepts either a bare file name (`2024-11-20-my-post.md`) or a
/// section-relative path (`01-biography/index.md`). Folder-based entries
/// use the folder name. The `.mdx`/`.md` extension is dropped, then a
/// `YYYY-MM-DD-` date prefix or a two-digit `NN-` order prefix.
///
/// ```
/// use quire_core::slug::slug_from_filename;
///
/// assert_eq!(slug_from_filename("2024-11-20-my-post.md"), "my-post");
/// assert_eq!(slug_from_filename("01-biography/index.md"), "biography");
/// ```
pub fn slug_from_filename(file_name: &str) -> String {
    let name = strip_extension(entry_name(file_name));
    let bytes = name.as_bytes();

    // Only the separator positions are checked, not every digit.
    if bytes.len() > 11
        && bytes[0].is_ascii_digit()
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b'-'
    {
        return name[11..].to_string();
    }

    match order_prefix(name) {
        Some((_, rest)) => rest.to_string(),
        None => name.to_string(),
    }
}

/// Split a `NN-slug` file name into its display order and slug
///
/// Only the order prefix is recognised here; names without one get order 0.
pub fn order_and_slug_from_filename(file_name: &str) -> (u32, String) {
    let name = strip_extension(entry_name(file_name));
    match order_prefix(name) {
        Some((order, rest)) => (order, rest.to_string()),
        None => (0, name.to_string()),
    }
}

/// Slug for a file on disk, with platform separators normalised
pub fn slug_from_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    slug_from_filename(&normalized)
}

fn entry_name(file_name: &str) -> &str {
    if !file_name.contains(['/', '\\']) {
        return file_name;
    }

    let parts: Vec<&str> = file_name.split(['/', '\\']).collect();
    let last = parts[parts.len() - 1];
    if parts.len() >= 2 && starts_with_ignore_case(last, "index.") {
        parts[parts.len() - 2]
    } else {
        last
    }
}

fn strip_extension(name: &str) -> &str {
    if ends_with_ignore_case(name, ".mdx") {
        &name[..name.len() - 4]
    } else if ends_with_ignore_case(name, ".md") {
        &name[..name.len() - 3]
    } else {
        name
    }
}

fn order_prefix(name: &str) -> Option<(u32, &str)> {
    let bytes = name.as_bytes();
    if bytes.len() > 3 && bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit() && bytes[2] == b'-'
    {
        let order = name[..2].parse().unwrap_or(0);
        Some((order, &name[3..]))
    } else {
        None
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.as_bytes()[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}
