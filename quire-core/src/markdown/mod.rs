//! Markdown rendering and derived views of a document.
//!
//! [`MarkdownService`] renders CommonMark (plus tables, footnotes,
//! strikethrough and task lists) to HTML and derives the outline, plain
//! text and reading time used by listings and the search index.

mod plain_text;

use crate::frontmatter::{parse_frontmatter, split_frontmatter, FrontmatterError};
use crate::models::TocItem;
use crate::slug::generate_slug;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::de::DeserializeOwned;

pub use plain_text::extract_plain_text;

pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

#[derive(Debug, Clone)]
struct Heading {
    level: u8,
    text: String,
    explicit_id: Option<String>,
}

impl Heading {
    fn id(&self) -> String {
        self.explicit_id
            .clone()
            .unwrap_or_else(|| generate_slug(&self.text))
    }
}

/// Markdown renderer with the site's extension set
#[derive(Debug, Clone)]
pub struct MarkdownService {
    options: Options,
}

impl MarkdownService {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Render Markdown to HTML
    ///
    /// Headings get an `id` from their text unless one is given with
    /// `{#id}`. Component placeholders pass through as raw HTML comments.
    pub fn to_html(&self, markdown: &str) -> String {
        if markdown.trim().is_empty() {
            return String::new();
        }

        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();
        let headings = collect_headings(&events);
        let events = attach_heading_ids(events, &headings);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Split off frontmatter, deserialize it into `T` and render the body
    ///
    /// Without a frontmatter block the whole input is rendered and the
    /// frontmatter is `None`. Malformed YAML is reported to the caller.
    pub fn parse_with_frontmatter<T: DeserializeOwned>(
        &self,
        markdown: &str,
    ) -> Result<(Option<T>, String), FrontmatterError> {
        let (frontmatter, body) = parse_frontmatter::<T>(markdown)?;
        Ok((frontmatter, self.to_html(body)))
    }

    /// Estimated reading time in whole minutes, never less than one
    pub fn calculate_reading_time(&self, markdown: &str, words_per_minute: u32) -> u32 {
        let words = extract_plain_text(markdown).split_whitespace().count() as u32;
        let wpm = if words_per_minute == 0 {
            DEFAULT_WORDS_PER_MINUTE
        } else {
            words_per_minute
        };
        words.div_ceil(wpm).max(1)
    }

    /// Readable text with Markdown syntax removed
    pub fn extract_plain_text(&self, markdown: &str) -> String {
        extract_plain_text(markdown)
    }

    /// Heading outline of a document
    ///
    /// A heading becomes a child of the nearest preceding heading with a
    /// strictly lower level. Headings inside code blocks are ignored and
    /// duplicate ids are kept as-is.
    pub fn extract_table_of_contents(&self, markdown: &str) -> Vec<TocItem> {
        let body = split_frontmatter(markdown).map_or(markdown, |(_, body)| body);
        let events: Vec<Event> = Parser::new_ext(body, self.options).collect();

        let flat: Vec<TocItem> = collect_headings(&events)
            .into_iter()
            .map(|h| TocItem {
                level: h.level,
                id: h.id(),
                text: h.text,
                children: Vec::new(),
            })
            .collect();

        let mut pos = 0;
        nest_headings(&flat, &mut pos, 0)
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}

fn nest_headings(flat: &[TocItem], pos: &mut usize, parent_level: u8) -> Vec<TocItem> {
    let mut items = Vec::new();
    while *pos < flat.len() && flat[*pos].level > parent_level {
        let mut item = flat[*pos].clone();
        *pos += 1;
        item.children = nest_headings(flat, pos, item.level);
        items.push(item);
    }
    items
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn collect_headings(events: &[Event]) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<Heading> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some(Heading {
                    level: heading_level(*level),
                    text: String::new(),
                    explicit_id: id.as_ref().map(|s| s.to_string()),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current.take() {
                    heading.text = heading.text.trim().to_string();
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }

    headings
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[Heading]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();
    let mut result = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                mut id,
                classes,
                attrs,
            }) => {
                if let Some(next) = heading_iter.next() {
                    if id.is_none() {
                        let slug = next.id();
                        if !slug.is_empty() {
                            id = Some(CowStr::Boxed(slug.into_boxed_str()));
                        }
                    }
                }
                result.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }
            other => result.push(other),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrontmatterData;

    fn service() -> MarkdownService {
        MarkdownService::new()
    }

    #[test]
    fn test_basic_markdown() {
        let html = service().to_html("Hello **world**!");
        assert!(html.contains("<p>"));
        assert!(html.contains("<strong>world</strong>"));
    }

    #[test]
    fn test_heading_ids() {
        let html = service().to_html("# Hello World\n\n## Section Two");
        assert!(html.contains(r#"<h1 id="hello-world">"#));
        assert!(html.contains(r#"<h2 id="section-two">"#));
    }

    #[test]
    fn test_explicit_heading_id_wins() {
        let html = service().to_html("## Install {#setup}");
        assert!(html.contains(r#"id="setup""#));
        assert!(!html.contains("install"));
    }

    #[test]
    fn test_code_blocks() {
        let html = service().to_html("```csharp\nvar x = 1;\n```");
        assert!(html.contains("<pre>"));
        assert!(html.contains("<code"));
        assert!(html.contains(r#"class="language-csharp""#));
        assert!(html.contains("var x = 1;"));
    }

    #[test]
    fn test_links() {
        let html = service().to_html("Visit [GitHub](https://github.com)");
        assert!(html.contains(r#"<a href="https://github.com""#));
        assert!(html.contains(">GitHub</a>"));
    }

    #[test]
    fn test_lists() {
        let html = service().to_html("- Item 1\n- Item 2\n- Item 3");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>Item 1</li>"));
    }

    #[test]
    fn test_task_lists() {
        let html = service().to_html("- [x] Done\n- [ ] Todo");
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_tables() {
        let html = service().to_html("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_placeholders_pass_through() {
        let html = service().to_html("Intro\n\n<!--component:comp_0-->\n\nOutro");
        assert!(html.contains("<!--component:comp_0-->"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(service().to_html(""), "");
        assert_eq!(service().to_html("  \n"), "");
    }

    #[test]
    fn test_parse_with_frontmatter() {
        let markdown = "---\ntitle: Test Post\ndescription: A test description\ntags:\n  - test\n  - sample\n---\n\n# Content Here\n\nSome text.";
        let (fm, html) = service()
            .parse_with_frontmatter::<FrontmatterData>(markdown)
            .unwrap();
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.description.as_deref(), Some("A test description"));
        assert_eq!(fm.tags, vec!["test", "sample"]);
        assert!(html.contains("<h1"));
        assert!(!html.contains("title:"));
    }

    #[test]
    fn test_parse_with_frontmatter_date() {
        let markdown = "---\ntitle: Blog Post\npublishDate: 2024-01-15\n---\n\nContent";
        let (fm, _) = service()
            .parse_with_frontmatter::<FrontmatterData>(markdown)
            .unwrap();
        let published = fm.unwrap().published_at().unwrap();
        assert_eq!(published.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn test_parse_without_frontmatter() {
        let (fm, html) = service()
            .parse_with_frontmatter::<FrontmatterData>("# Just Content\n\nNo frontmatter here.")
            .unwrap();
        assert!(fm.is_none());
        assert!(html.contains("<h1"));
    }

    #[test]
    fn test_parse_with_malformed_frontmatter_errors() {
        let result = service()
            .parse_with_frontmatter::<FrontmatterData>("---\ntitle: [oops\n---\nBody");
        assert!(result.is_err());
    }

    #[test]
    fn test_reading_time_minimum() {
        assert_eq!(service().calculate_reading_time("Hello world.", 200), 1);
        assert_eq!(service().calculate_reading_time("", 200), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words = vec!["word"; 400].join(" ");
        assert_eq!(service().calculate_reading_time(&words, 200), 2);

        let words = vec!["word"; 300].join(" ");
        assert_eq!(service().calculate_reading_time(&words, 100), 3);

        let words = vec!["word"; 201].join(" ");
        assert_eq!(
            service().calculate_reading_time(&words, DEFAULT_WORDS_PER_MINUTE),
            2
        );
    }

    #[test]
    fn test_reading_time_ignores_markup() {
        let time = service().calculate_reading_time(
            "**Bold** and *italic* and `code` with [link](url)",
            DEFAULT_WORDS_PER_MINUTE,
        );
        assert_eq!(time, 1);
    }

    #[test]
    fn test_toc_simple() {
        let markdown = "# Heading 1\n\nContent\n\n## Heading 2\n\nMore content\n\n## Heading 3\n";
        let toc = service().extract_table_of_contents(markdown);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].text, "Heading 1");
        assert_eq!(toc[0].children.len(), 2);
    }

    #[test]
    fn test_toc_ids() {
        let toc = service().extract_table_of_contents("# Hello World");
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].id, "hello-world");
        assert_eq!(toc[0].level, 1);
    }

    #[test]
    fn test_toc_empty() {
        assert!(service()
            .extract_table_of_contents("Just some text without any headings.")
            .is_empty());
    }

    #[test]
    fn test_toc_nested() {
        let markdown = "# Chapter 1\n## Section 1.1\n### Subsection 1.1.1\n## Section 1.2\n# Chapter 2\n## Section 2.1\n";
        let toc = service().extract_table_of_contents(markdown);
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].text, "Chapter 1");
        assert_eq!(toc[0].children.len(), 2);
        assert_eq!(toc[0].children[0].children.len(), 1);
        assert_eq!(toc[0].children[0].id, "section-1.1");
        assert_eq!(toc[1].text, "Chapter 2");
        assert_eq!(toc[1].children.len(), 1);
    }

    #[test]
    fn test_toc_skipped_levels() {
        // h3 under h1, then an h2 is a sibling of the h3, not its child.
        let toc = service().extract_table_of_contents("# A\n### B\n## C\n");
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].children.len(), 2);
        assert!(toc[0].children[0].children.is_empty());
    }

    #[test]
    fn test_toc_ignores_code_and_frontmatter() {
        let markdown = "---\ntitle: Doc\n---\n\n# Real\n\n```\n# not a heading\n```\n";
        let toc = service().extract_table_of_contents(markdown);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].text, "Real");
    }

    #[test]
    fn test_toc_keeps_duplicate_ids() {
        let toc = service().extract_table_of_contents("## Notes\n## Notes\n");
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].id, toc[1].id);
    }

    #[test]
    fn test_toc_inline_code_in_heading() {
        let toc = service().extract_table_of_contents("## Using `cargo`");
        assert_eq!(toc[0].text, "Using cargo");
        assert_eq!(toc[0].id, "using-cargo");
    }
}
