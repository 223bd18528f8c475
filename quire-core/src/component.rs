//! Embedded component extraction.
//!
//! Content files may embed UI components with a double-bracket syntax:
//!
//! ```text
//! [[YouTube videoId="abc123"]]
//! [[FloatingImage src="./photo.jpg" position=right]]
//! ## Caption
//! Text that wraps around the image.
//! [[/FloatingImage]]
//! ```
//!
//! Components are cut out of the Markdown before rendering and replaced by
//! `<!--component:comp_N-->` markers, which survive Markdown rendering as raw
//! HTML comments and are later swapped for the real component.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

static OPEN_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static SELF_CLOSING_REGEX: OnceLock<Regex> = OnceLock::new();
static PARAMETER_REGEX: OnceLock<Regex> = OnceLock::new();
static IMPORT_REGEX: OnceLock<Regex> = OnceLock::new();

fn open_tag_regex() -> &'static Regex {
    OPEN_TAG_REGEX.get_or_init(|| Regex::new(r"\[\[(?P<type>\w+)(?P<params>[^\]]*)\]\]").unwrap())
}

fn self_closing_regex() -> &'static Regex {
    SELF_CLOSING_REGEX
        .get_or_init(|| Regex::new(r"\[\[(?P<type>\w+)(?P<params>[^\]]*?)/??\]\]").unwrap())
}

fn parameter_regex() -> &'static Regex {
    PARAMETER_REGEX.get_or_init(|| {
        Regex::new(r#"(?P<name>\w+)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>\S+))"#)
            .unwrap()
    })
}

fn import_regex() -> &'static Regex {
    IMPORT_REGEX.get_or_init(|| Regex::new(r"(?m)^\s*import\s+.*?;\s*$").unwrap())
}

/// Component parameters keyed case-insensitively
///
/// Keys are stored lower-cased; lookups lower-case the requested name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter; a later value for the same name wins
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A component found in content source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedComponent {
    /// Component name as written (`YouTube`, `FloatingImage`, ...)
    #[serde(rename = "type")]
    pub component_type: String,
    pub parameters: Parameters,
    /// Trimmed body of a block component; `None` for self-closing ones
    pub inner_content: Option<String>,
    /// Byte offset of `original_text` in the source the component was extracted from
    pub position: usize,
    pub original_text: String,
    pub placeholder_id: String,
    /// Content folder the source lives in, for resolving relative asset paths
    #[serde(default)]
    pub base_path: Option<String>,
}

impl EmbeddedComponent {
    /// The marker that stands in for this component after transformation
    pub fn placeholder(&self) -> String {
        placeholder_marker(&self.placeholder_id)
    }
}

/// HTML comment used as a component placeholder
pub fn placeholder_marker(id: &str) -> String {
    format!("<!--component:{}-->", id)
}

/// Extracts embedded components and swaps them for placeholders
#[derive(Debug, Clone, Default)]
pub struct ContentParser {
    base_path: Option<String>,
}

impl ContentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser whose components carry `base_path`
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    /// Find every component in `content`, ordered by position
    ///
    /// Block components are located first; a self-closing match that starts
    /// where a block starts is the block's opening tag and is skipped.
    /// Placeholder ids follow discovery order, not the final sort order.
    pub fn extract_components(&self, content: &str) -> Vec<EmbeddedComponent> {
        let mut components = Vec::new();
        let mut counter = 0usize;

        for block in find_blocks(content) {
            let mut component = self.build_component(
                block.type_name,
                block.params,
                block.start,
                &content[block.start..block.end],
                &mut counter,
            );
            component.inner_content = Some(block.inner.trim().to_string());
            components.push(component);
        }

        let block_starts: Vec<usize> = components.iter().map(|c| c.position).collect();

        for caps in self_closing_regex().captures_iter(content) {
            let (Some(whole), Some(type_name)) = (caps.get(0), caps.name("type")) else {
                continue;
            };
            if block_starts.contains(&whole.start()) {
                continue;
            }
            let params = caps.name("params").map_or("", |m| m.as_str());
            let component = self.build_component(
                type_name.as_str(),
                params,
                whole.start(),
                whole.as_str(),
                &mut counter,
            );
            components.push(component);
        }

        components.sort_by_key(|c| c.position);
        components
    }

    /// Parse `name="value" name='value' name=value` into parameters
    pub fn parse_parameters(params: &str) -> Parameters {
        let mut result = Parameters::new();
        if params.trim().is_empty() {
            return result;
        }

        for caps in parameter_regex().captures_iter(params) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("uq"))
                .map_or("", |m| m.as_str());
            result.insert(name.as_str(), value);
        }

        result
    }

    /// Replace each component's source span with its placeholder marker
    ///
    /// Spans are rewritten from the end of the document backwards so earlier
    /// offsets stay valid. A component whose span no longer matches its
    /// original text (overlapping matches) is left in place.
    pub fn replace_with_placeholders(
        &self,
        content: &str,
        components: &[EmbeddedComponent],
    ) -> String {
        let mut ordered: Vec<&EmbeddedComponent> = components.iter().collect();
        ordered.sort_by(|a, b| b.position.cmp(&a.position));

        let mut result = content.to_string();
        for component in ordered {
            let end = component.position + component.original_text.len();
            if result.get(component.position..end) != Some(component.original_text.as_str()) {
                tracing::warn!(
                    "Component {} at {} no longer matches its source; leaving it in place",
                    component.placeholder_id,
                    component.position
                );
                continue;
            }
            result.replace_range(component.position..end, &component.placeholder());
        }

        result
    }

    /// Drop MDX `import ...;` lines
    pub fn remove_import_statements(&self, content: &str) -> String {
        import_regex().replace_all(content, "").into_owned()
    }

    /// Strip imports, extract components and substitute placeholders
    pub fn transform(&self, content: &str) -> (String, Vec<EmbeddedComponent>) {
        let content = self.remove_import_statements(content);
        let components = self.extract_components(&content);
        let transformed = self.replace_with_placeholders(&content, &components);
        tracing::debug!("Extracted {} embedded components", components.len());
        (transformed, components)
    }

    fn build_component(
        &self,
        type_name: &str,
        params: &str,
        position: usize,
        original_text: &str,
        counter: &mut usize,
    ) -> EmbeddedComponent {
        let placeholder_id = format!("comp_{}", *counter);
        *counter += 1;

        EmbeddedComponent {
            component_type: type_name.to_string(),
            parameters: Self::parse_parameters(params),
            inner_content: None,
            position,
            original_text: original_text.to_string(),
            placeholder_id,
            base_path: self.base_path.clone(),
        }
    }
}

struct BlockMatch<'a> {
    type_name: &'a str,
    params: &'a str,
    inner: &'a str,
    start: usize,
    end: usize,
}

/// Locate `[[Type ...]]inner[[/Type]]` blocks
///
/// The closing tag must name the same type (case-insensitively) and the
/// first such close ends the block. Scanning resumes after a matched block;
/// an opening tag with no close is retried one byte further on.
fn find_blocks(content: &str) -> Vec<BlockMatch<'_>> {
    let mut blocks = Vec::new();
    let mut close_tags: HashMap<String, Regex> = HashMap::new();
    let mut pos = 0;

    while pos < content.len() {
        let Some(caps) = open_tag_regex().captures_at(content, pos) else {
            break;
        };
        let (Some(open), Some(type_name)) = (caps.get(0), caps.name("type")) else {
            break;
        };

        let key = type_name.as_str().to_lowercase();
        if !close_tags.contains_key(&key) {
            let pattern = format!(r"(?i)\[\[/{}\]\]", regex::escape(type_name.as_str()));
            match Regex::new(&pattern) {
                Ok(re) => {
                    close_tags.insert(key.clone(), re);
                }
                Err(e) => {
                    tracing::warn!("Skipping component tag {}: {}", type_name.as_str(), e);
                    pos = next_char_boundary(content, open.start());
                    continue;
                }
            }
        }

        match close_tags[&key].find_at(content, open.end()) {
            Some(close) => {
                blocks.push(BlockMatch {
                    type_name: type_name.as_str(),
                    params: caps.name("params").map_or("", |m| m.as_str()),
                    inner: &content[open.end()..close.start()],
                    start: open.start(),
                    end: close.end(),
                });
                pos = close.end();
            }
            None => pos = next_char_boundary(content, open.start()),
        }
    }

    blocks
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    let mut next = from + 1;
    while next < s.len() && !s.is_char_boundary(next) {
        next += 1;
    }
    next
}
