//! Frontmatter parsing from markdown files.

use crate::models::FrontmatterData;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?ms)\A---[ \t]*\r?\n(?P<yaml>.*?)^---[ \t]*\r?$").unwrap()
    })
}

/// Split a leading `---` fenced block from the body
///
/// Returns `(yaml, body)`, or `None` when the content does not start with a
/// complete frontmatter block. A leading UTF-8 byte order mark is ignored.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let captures = frontmatter_regex().captures(content)?;
    let yaml = captures.name("yaml")?.as_str();
    let end = captures.get(0)?.end();
    let body = &content[end..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some((yaml, body))
}

/// Parse frontmatter into `T`, returning it together with the body
///
/// Keys are matched case-insensitively and without `_`/`-`, so
/// `publishDate`, `PublishDate` and `publish_date` all bind the same field.
/// Content without a frontmatter block, or with an empty one, yields `None`.
///
/// # Example
///
/// ```
/// use quire_core::frontmatter::parse_frontmatter;
/// use quire_core::FrontmatterData;
///
/// let content = "---\nTitle: My Post\npublish_date: 2025-01-01\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter::<FrontmatterData>(content).unwrap();
/// let fm = fm.unwrap();
/// assert_eq!(fm.title.as_deref(), Some("My Post"));
/// assert_eq!(fm.publish_date.as_deref(), Some("2025-01-01"));
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter<T: DeserializeOwned>(
    content: &str,
) -> Result<(Option<T>, &str), FrontmatterError> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok((None, content));
    };

    if yaml.trim().is_empty() {
        return Ok((None, body));
    }

    let value: Value = serde_yaml::from_str(yaml)?;
    if value.is_null() {
        return Ok((None, body));
    }

    let data = serde_yaml::from_value(normalize_keys(value))?;
    Ok((Some(data), body))
}

/// Extract frontmatter for the generators
///
/// Never fails: malformed YAML is logged and treated like a missing block,
/// in which case the original content is returned untouched.
pub fn extract_frontmatter(content: &str) -> (Option<FrontmatterData>, String) {
    match parse_frontmatter::<FrontmatterData>(content) {
        Ok((Some(fm), body)) => (Some(fm), body.to_string()),
        Ok((None, _)) => (None, content.to_string()),
        Err(e) => {
            tracing::debug!("Ignoring malformed frontmatter: {}", e);
            (None, content.to_string())
        }
    }
}

/// Lower-case top-level keys and drop `_`/`-`
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut normalized = Mapping::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    Value::String(s) => Value::String(normalize_key(&s)),
                    other => other,
                };
                normalized.insert(key, value);
            }
            Value::Mapping(normalized)
        }
        other => other,
    }
}

pub(crate) fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
