//! Markdown to plain text for search and reading-time estimates.

use crate::frontmatter::split_frontmatter;
use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    fence: Regex,
    comment: Regex,
    image: Regex,
    link: Regex,
    heading: Regex,
    blockquote: Regex,
    rule: Regex,
    bullet: Regex,
    html_tag: Regex,
    underscore_emphasis: Regex,
    emphasis: Regex,
    spaces: Regex,
    blank_lines: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        fence: Regex::new(r"(?m)^[ \t]*(?:```|~~~).*$").unwrap(),
        comment: Regex::new(r"(?s)<!--.*?-->").unwrap(),
        image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap(),
        link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap(),
        heading: Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]*").unwrap(),
        blockquote: Regex::new(r"(?m)^[ \t]*>[ \t]?").unwrap(),
        rule: Regex::new(r"(?m)^[ \t]*(?:[-*_][ \t]*){3,}$").unwrap(),
        bullet: Regex::new(r"(?m)^[ \t]*[-+*][ \t]+").unwrap(),
        html_tag: Regex::new(r"<[^>\n]+>").unwrap(),
        underscore_emphasis: Regex::new(r"\b_{1,2}([^_\n]+?)_{1,2}\b").unwrap(),
        emphasis: Regex::new(r"\*+|~~|`+").unwrap(),
        spaces: Regex::new(r"[ \t\u{a0}]+").unwrap(),
        blank_lines: Regex::new(r"\n{2,}").unwrap(),
    })
}

/// Strip Markdown syntax, leaving readable text
///
/// Removes frontmatter, code fences (the code itself is kept), images,
/// link targets, heading/blockquote/list markers, emphasis, inline code
/// ticks, HTML tags and component placeholders. Runs of spaces become one
/// space and blank lines collapse to a single newline.
pub fn extract_plain_text(markdown: &str) -> String {
    let p = patterns();
    let body = split_frontmatter(markdown).map_or(markdown, |(_, body)| body);
    let body = body.replace("\r\n", "\n");

    let text = p.fence.replace_all(&body, "");
    let text = p.comment.replace_all(&text, " ");
    let text = p.image.replace_all(&text, "");
    let text = p.link.replace_all(&text, "$1");
    let text = p.heading.replace_all(&text, "");
    let text = p.blockquote.replace_all(&text, "");
    let text = p.rule.replace_all(&text, "");
    let text = p.bullet.replace_all(&text, "");
    let text = p.html_tag.replace_all(&text, "");
    let text = p.underscore_emphasis.replace_all(&text, "$1");
    let text = p.emphasis.replace_all(&text, "");
    let text = p.spaces.replace_all(&text, " ");

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    p.blank_lines.replace_all(&joined, "\n").trim().to_string()
}
